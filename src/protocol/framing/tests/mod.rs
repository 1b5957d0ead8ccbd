mod datagram;
