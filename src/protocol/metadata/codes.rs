//! Static code table
//!
//! Maps `(category, code)` pairs onto a semantic field name and the kind
//! used to decode the payload. Core codes follow the DMAP/DAAP/DACP
//! content-code names; the kinds of some rarely seen codes are best guesses.

use std::collections::HashMap;
use std::sync::LazyLock;

use super::item::{Category, FourCc};
use super::value::{CustomDecoder, ValueKind};

/// One code table entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeEntry {
    /// Four-character code
    pub code: FourCc,
    /// Semantic field name
    pub name: &'static str,
    /// Payload kind
    pub kind: ValueKind,
}

const STR: ValueKind = ValueKind::String;
const INT: ValueKind = ValueKind::Integer;
const BOOL: ValueKind = ValueKind::Boolean;
const DATE: ValueKind = ValueKind::Timestamp;
const B64: ValueKind = ValueKind::Base64;
const RAW: ValueKind = ValueKind::Bytes;

const fn entry(code: &[u8; 4], name: &'static str, kind: ValueKind) -> CodeEntry {
    CodeEntry {
        code: FourCc::new(code),
        name,
        kind,
    }
}

/// Codes forwarded from the source (`core`)
pub static CORE_CODES: &[CodeEntry] = &[
    entry(b"asaa", "songalbumartist", STR),
    entry(b"agal", "unknown_al", STR),
    entry(b"agar", "ar", STR),
    entry(b"apro", "protocolversion", STR),
    entry(b"abpl", "baseplaylist", INT),
    entry(b"abal", "browsealbumlisting", STR),
    entry(b"abar", "browseartistlisting", STR),
    entry(b"abcp", "browsecomposerlisting", STR),
    entry(b"abgn", "browsegenrelisting", STR),
    entry(b"abro", "databasebrowse", STR),
    entry(b"aply", "databaseplaylists", STR),
    entry(b"adbs", "databasesongs", STR),
    entry(b"aeCs", "artworkchecksum", INT),
    entry(b"aeCF", "cloud_flavor_id", INT),
    entry(b"aeCd", "cloud_id", INT),
    entry(b"aeCK", "cloud_library_kind", INT),
    entry(b"aeCM", "cloud_status", INT),
    entry(b"aeCU", "cloud_user_id", INT),
    entry(b"aecp", "collection_description", STR),
    entry(b"aeCR", "content_rating", STR),
    entry(b"aeK1", "drm_key1_id", INT),
    entry(b"aeK2", "drm_key2_id", INT),
    entry(b"aeDP", "drm_platform_id", INT),
    entry(b"aeDR", "drm_user_id", INT),
    entry(b"aeDV", "drm_versions", INT),
    entry(b"aeEN", "episode_num_str", STR),
    entry(b"aeES", "episode_sort", INT),
    entry(b"aeMk", "extended_media_kind", INT),
    entry(b"aeGU", "gapless_dur", INT),
    entry(b"aeGE", "gapless_enc_del", INT),
    entry(b"aeGD", "gapless_enc_dr", INT),
    entry(b"aeGH", "gapless_heur", INT),
    entry(b"aeGR", "gapless_resy", INT),
    entry(b"aeGs", "can_be_genius_seed", BOOL),
    entry(b"aeHV", "has_video", BOOL),
    entry(b"aeHD", "is_hd_video", BOOL),
    entry(b"aeAI", "itms_artistid", INT),
    entry(b"aeCI", "itms_composerid", INT),
    entry(b"aeGI", "itms_genreid", INT),
    entry(b"aePI", "itms_playlistid", INT),
    entry(b"aeSI", "itms_songid", INT),
    entry(b"aeSF", "itms_storefrontid", INT),
    entry(b"aels", "liked_state", INT),
    entry(b"aeMK", "mediakind", INT),
    entry(b"aeml", "media_kind_listing", STR),
    entry(b"aemi", "media_kind_listing_item", STR),
    entry(b"aeMX", "movie_info_xml", STR),
    entry(b"aeSV", "music_sharing_version", INT),
    entry(b"aeNN", "network_name", STR),
    entry(b"aeND", "non_drm_user_id", INT),
    entry(b"aeNV", "norm_volume", INT),
    entry(b"aePC", "is_podcast", BOOL),
    entry(b"aePP", "is_podcast_playlist", BOOL),
    entry(b"aeSG", "saved_genius", BOOL),
    entry(b"aeSU", "season_num", INT),
    entry(b"aeSN", "series_name", STR),
    entry(b"aeSP", "smart_playlist", INT),
    entry(b"asrs", "songuserratingstatus", INT),
    entry(b"aePS", "special_playlist", BOOL),
    entry(b"aeSE", "store_pers_id", INT),
    entry(b"aeFP", "unknown_FP", INT),
    entry(b"aeAK", "unknown", STR),
    entry(b"aeCS", "artworkchecksum", INT),
    entry(b"aeFR", "unknown_FR", INT),
    entry(b"aeIM", "unknown_IM", INT),
    entry(b"aeMQ", "unknown_MQ", INT),
    entry(b"aeRM", "unknown_RM", INT),
    entry(b"aeSL", "unknown_SL", INT),
    entry(b"aeSR", "unknown_SR", INT),
    entry(b"aeSX", "unknown_SX", INT),
    entry(b"aeTr", "unknown_Tr", INT),
    entry(b"aeXD", "xid", STR),
    entry(b"agac", "groupalbumcount", INT),
    entry(b"apso", "playlistsongs", STR),
    entry(b"aprm", "playlistrepeatmode", INT),
    entry(b"apsm", "playlistshufflemode", INT),
    entry(b"arsv", "resolve", STR),
    entry(b"arif", "resolveinfo", STR),
    entry(b"avdb", "serverdatabases", STR),
    entry(b"asal", "songalbum", STR),
    entry(b"asai", "songalbumid", INT),
    entry(b"aslr", "songalbumuserrating", INT),
    entry(b"asas", "songalbumuserratingstatus", INT),
    entry(b"asar", "songartist", STR),
    entry(b"asri", "songartistid", INT),
    entry(b"asac", "songartworkcount", INT),
    entry(b"asbt", "songbeatsperminute", INT),
    entry(b"asbr", "songbitrate", INT),
    entry(b"asct", "songcategory", STR),
    entry(b"ascs", "songcodecsubtype", INT),
    entry(b"ascd", "songcodectype", STR),
    entry(b"ascm", "songcomment", STR),
    entry(b"asco", "songcompilation", BOOL),
    entry(b"ascp", "songcomposer", STR),
    entry(b"ascn", "songcontentdescription", STR),
    entry(b"ascr", "songcontentrating", INT),
    entry(b"asdk", "songdatakind", INT),
    entry(b"asul", "songdataurl", STR),
    entry(b"asda", "songdateadded", DATE),
    entry(b"asdm", "songdatemodified", DATE),
    entry(b"aspl", "songdateplayed", DATE),
    entry(b"asdp", "songdatepurchased", DATE),
    entry(b"asdr", "songdatereleased", DATE),
    entry(b"asdt", "songdescription", STR),
    entry(b"asdb", "songdisabled", BOOL),
    entry(b"asdc", "songdisccount", INT),
    entry(b"asdn", "songdiscnumber", INT),
    entry(b"aseq", "songeqpreset", STR),
    entry(b"ases", "songexcludefromshuffle", BOOL),
    entry(b"ased", "songextradata", INT),
    entry(b"asfm", "songformat", STR),
    entry(b"asgp", "songgapless", BOOL),
    entry(b"asgn", "songgenre", STR),
    entry(b"agrp", "songgrouping", STR),
    entry(b"ashp", "songhasbeenplayed", BOOL),
    entry(b"asky", "songkeywords", STR),
    entry(b"askd", "songlastskipdate", DATE),
    entry(b"aslc", "songlongcontentdescription", STR),
    entry(b"asls", "songlongsize", INT),
    entry(b"aspu", "songpodcasturl", STR),
    entry(b"asrv", "songrelativevolume", INT),
    entry(b"assr", "songsamplerate", INT),
    entry(b"assz", "songsize", INT),
    entry(b"asst", "songstarttime", INT),
    entry(b"assp", "songstoptime", INT),
    entry(b"astm", "songtime", INT),
    entry(b"astc", "songtrackcount", INT),
    entry(b"astn", "songtracknumber", INT),
    entry(b"aspc", "songuserplaycount", INT),
    entry(b"asur", "songuserrating", INT),
    entry(b"askp", "songuserskipcount", INT),
    entry(b"asyr", "songyear", INT),
    entry(b"assu", "sortalbum", STR),
    entry(b"assl", "sortalbumartist", STR),
    entry(b"assa", "sortartist", STR),
    entry(b"asbk", "bookmarkable", BOOL),
    entry(b"assc", "sortcomposer", STR),
    entry(b"assn", "sortname", STR),
    entry(b"asss", "sortseriesname", STR),
    entry(b"ated", "supportsextradata", INT),
    entry(b"asgr", "supportsgroups", INT),
    entry(b"mscu", "unknown_cu", INT),
    entry(b"asse", "unknown_se", INT),
    entry(b"capr", "protocolversion", STR),
    entry(b"caar", "availablerepeatstates", INT),
    entry(b"caas", "availableshufflestates", INT),
    entry(b"caci", "controlint", STR),
    entry(b"cafe", "fullscreenenabled", BOOL),
    entry(b"cafs", "fullscreen", BOOL),
    entry(b"canp", "nowplayingids", B64),
    entry(b"canl", "nowplayingalbum", STR),
    entry(b"cana", "nowplayingartist", STR),
    entry(b"cang", "nowplayinggenre", STR),
    entry(b"cann", "nowplayingname", STR),
    entry(b"ceQR", "playqueue_contents_response", STR),
    entry(b"caps", "playerstate", INT),
    entry(b"cant", "nowplayingtime", INT),
    entry(b"cast", "songtime", INT),
    entry(b"carp", "repeatstate", INT),
    entry(b"cash", "shufflestate", INT),
    entry(b"caia", "isactive", BOOL),
    entry(b"casp", "speakers", STR),
    entry(b"cads", "unknown_ds", INT),
    entry(b"caip", "unknown_ip", INT),
    entry(b"caiv", "unknown_iv", INT),
    entry(b"caks", "ss", INT),
    entry(b"caov", "ov", INT),
    entry(b"casa", "unknown_sa", INT),
    entry(b"casc", "ss", INT),
    entry(b"cass", "ss", INT),
    entry(b"casu", "unknown_su", INT),
    entry(b"cavd", "unknown_vd", INT),
    entry(b"cave", "visualizerenabled", BOOL),
    entry(b"cavs", "visualizer", INT),
    entry(b"cavc", "volumecontrollable", INT),
    entry(b"cmmk", "mediakind", INT),
    entry(b"cmnm", "unknown_nm", STR),
    entry(b"cmty", "unknown_ty", STR),
    entry(b"ceGS", "genius_selectable", BOOL),
    entry(b"ceQa", "playqueue_album", STR),
    entry(b"ceQr", "playqueue_artist", STR),
    entry(b"ceQg", "playqueue_genre", STR),
    entry(b"ceQs", "playqueue_id", INT),
    entry(b"ceQn", "playqueue_name", STR),
    entry(b"ceSG", "saved_genius", BOOL),
    entry(b"ceQI", "unknown", INT),
    entry(b"ceSX", "sx", INT),
    entry(b"ceQh", "unknown", STR),
    entry(b"ceQi", "unknown", INT),
    entry(b"ceQk", "unknown", STR),
    entry(b"ceQl", "unknown", STR),
    entry(b"ceQm", "unknown", INT),
    entry(b"ceQS", "playqueue_content_unknown", STR),
    entry(b"ceQu", "unknown_Qu", INT),
    entry(b"cmpr", "protocolversion", STR),
    entry(b"cmpa", "pa", STR),
    entry(b"cmpg", "unknown_pg", B64),
    entry(b"cmst", "playstatus", STR),
    entry(b"cmgt", "getpropertyresponse", STR),
    entry(b"cmvo", "volume", INT),
    entry(b"cmsr", "serverrevision", INT),
    entry(b"cmik", "unknown_ik", INT),
    entry(b"cmrl", "rl", INT),
    entry(b"cmsp", "unknown_sp", INT),
    entry(b"cmsv", "sv", INT),
    entry(b"msau", "authenticationmethod", INT),
    entry(b"msas", "authenticationschemes", INT),
    entry(b"mbcl", "bag", STR),
    entry(b"mcon", "container", STR),
    entry(b"mctc", "containercount", INT),
    entry(b"mcti", "containeritemid", INT),
    entry(b"mcna", "contentcodesname", STR),
    entry(b"mcnm", "contentcodesnumber", INT),
    entry(b"mccr", "contentcodesresponse", STR),
    entry(b"mcty", "contentcodestype", INT),
    entry(b"msdc", "databasescount", INT),
    entry(b"mdbk", "databasesharetype", INT),
    entry(b"mudl", "deletedidlisting", STR),
    entry(b"mdcl", "dictionary", STR),
    entry(b"mdst", "downloadstatus", INT),
    entry(b"meds", "editcommandssupported", INT),
    entry(b"mimc", "itemcount", INT),
    entry(b"miid", "itemid", INT),
    entry(b"mikd", "itemkind", INT),
    entry(b"minm", "itemname", STR),
    entry(b"mlcl", "listing", STR),
    entry(b"mlit", "listingitem", STR),
    entry(b"mslr", "loginrequired", BOOL),
    entry(b"mlog", "loginresponse", STR),
    entry(b"mpro", "protocolversion", STR),
    entry(b"mpco", "parentcontainerid", INT),
    entry(b"mper", "persistentid", INT),
    entry(b"mrpr", "remotepersistentid", INT),
    entry(b"mrco", "returnedcount", INT),
    entry(b"msrv", "serverinforesponse", STR),
    entry(b"musr", "serverrevision", INT),
    entry(b"mlid", "sessionid", INT),
    entry(b"mshc", "sortingheaderchar", INT),
    entry(b"mshi", "sortingheaderindex", INT),
    entry(b"mshl", "sortingheaderlisting", STR),
    entry(b"mshn", "sortingheadernumber", INT),
    entry(b"msma", "unknown_ma", INT),
    entry(b"mtco", "specifiedtotalcount", INT),
    entry(b"mstt", "status", INT),
    entry(b"msts", "statusstring", STR),
    entry(b"msal", "supportsautologout", BOOL),
    entry(b"msbr", "supportsbrowse", BOOL),
    entry(b"msex", "supportsextensions", BOOL),
    entry(b"msix", "supportsindex", BOOL),
    entry(b"mspi", "supportspersistentids", BOOL),
    entry(b"msed", "unknown_ed", INT),
    entry(b"msqy", "supportsquery", BOOL),
    entry(b"msrs", "supportsresolve", BOOL),
    entry(b"msup", "supportsupdate", BOOL),
    entry(b"mstm", "timeoutinterval", INT),
    entry(b"msml", "unknown_ml", STR),
    entry(b"mupd", "updateresponse", STR),
    entry(b"muty", "updatetype", INT),
    entry(b"mstc", "utctime", DATE),
    entry(b"msto", "utcoffset", INT),
    entry(b"____", "req_fplay", INT),
    entry(b"ceVO", "unknown_voting", INT),
    entry(b"pasp", "aspectratio", STR),
    entry(b"picd", "creationdate", DATE),
    entry(b"peak", "album_kind", INT),
    entry(b"peed", "exposure_date", DATE),
    entry(b"pefc", "faces", STR),
    entry(b"peki", "key_image_id", INT),
    entry(b"pemd", "modification_date", DATE),
    entry(b"pfai", "failureids", STR),
    entry(b"pfdt", "filedata", B64),
    entry(b"pcmt", "imagecomments", STR),
    entry(b"pimf", "imagefilename", STR),
    entry(b"pifs", "imagefilesize", INT),
    entry(b"pfmt", "imageformat", STR),
    entry(b"plsz", "imagelargefilesize", INT),
    entry(b"phgt", "imagepixelheight", INT),
    entry(b"pwth", "imagepixelwidth", INT),
    entry(b"prat", "imagerating", INT),
    entry(b"ppro", "protocolversion", STR),
    entry(b"pret", "retryids", STR),
    entry(b"ipsa", "iphotoslideshowadvancedoptions", STR),
    entry(b"ipsl", "iphotoslideshowoptions", STR),
    entry(b"aeFA", "drm_family_id", INT),
    entry(b"aeDL", "drm_downloader_user_id", INT),
    entry(b"meia", "unknown_meia", INT),
    entry(b"meip", "unknown_meip", INT),
    entry(b"mext", "unknown_mext", INT),
    entry(b"ajal", "unknown_ajal", INT),
    entry(b"ajcA", "unknown_ajca", INT),
    entry(b"awrk", "unknown_awrk", RAW),
    entry(b"amvm", "unknown_amvm", RAW),
    entry(b"amvc", "unknown_amvc", INT),
    entry(b"amvn", "unknown_amvn", INT),
    entry(b"ajuw", "unknown_ajuw", INT),
    entry(b"ajAV", "unknown_ajAV", INT),
    entry(b"ajAT", "unknown_ajAT", INT),
    entry(b"ajAE", "unknown_ajAE", INT),
    entry(b"ajAS", "unknown_ajAS", INT),];

/// Codes generated by shairport-sync (`ssnc`)
pub static SSNC_CODES: &[CodeEntry] = &[
    entry(b"pcst", "picturestart", INT),
    entry(b"pcen", "pictureend", INT),
    entry(b"PICT", "artwork", RAW),
    entry(b"mdst", "metadatastart", RAW),
    entry(b"mden", "metadataend", RAW),
    entry(b"pbeg", "streambegin", RAW),
    entry(b"pfls", "streampause", RAW),
    entry(b"prsm", "streamstartresume", RAW),
    entry(b"pend", "streamstop", RAW),
    entry(
        b"prgr",
        "playbackprogress",
        ValueKind::Custom(CustomDecoder::Progress),
    ),
    entry(
        b"pvol",
        "playbackvolume",
        ValueKind::Custom(CustomDecoder::Volume),
    ),
    entry(b"daid", "dacpid", STR),
    entry(b"acre", "active", STR),
    entry(b"snua", "useragent", STR),
    entry(b"flsr", "flushrequested", RAW),
    entry(b"pffr", "firstframereceived", RAW),
    entry(b"dapo", "clientportnumber", STR),
    entry(b"clip", "clientipaddress", STR),
    entry(b"svip", "serveripaddress", STR),
    entry(b"snam", "sourcename", STR),
];

/// Core codes folded into the track info block
pub static TRACK_INFO_CODES: &[FourCc] = &[
    FourCc::new(b"mikd"),
    FourCc::new(b"minm"),
    FourCc::new(b"mper"),
    FourCc::new(b"miid"),
    FourCc::new(b"asal"),
    FourCc::new(b"asar"),
    FourCc::new(b"ascm"),
    FourCc::new(b"asco"),
    FourCc::new(b"asbr"),
    FourCc::new(b"ascp"),
    FourCc::new(b"asda"),
    FourCc::new(b"aspl"),
    FourCc::new(b"asdm"),
    FourCc::new(b"asdc"),
    FourCc::new(b"asdn"),
    FourCc::new(b"aseq"),
    FourCc::new(b"asgn"),
    FourCc::new(b"asdt"),
    FourCc::new(b"asrv"),
    FourCc::new(b"assr"),
    FourCc::new(b"assz"),
    FourCc::new(b"asst"),
    FourCc::new(b"assp"),
    FourCc::new(b"astm"),
    FourCc::new(b"astc"),
    FourCc::new(b"astn"),
    FourCc::new(b"asur"),
    FourCc::new(b"asyr"),
    FourCc::new(b"asfm"),
    FourCc::new(b"asdb"),
    FourCc::new(b"asdk"),
    FourCc::new(b"asbt"),
    FourCc::new(b"agrp"),
    FourCc::new(b"ascd"),
    FourCc::new(b"ascs"),
    FourCc::new(b"asct"),
    FourCc::new(b"ascn"),
    FourCc::new(b"ascr"),
    FourCc::new(b"asri"),
    FourCc::new(b"asai"),
    FourCc::new(b"askd"),
    FourCc::new(b"assn"),
    FourCc::new(b"assu"),
    FourCc::new(b"aeNV"),
    FourCc::new(b"aePC"),
    FourCc::new(b"aeHV"),
    FourCc::new(b"aeMK"),
    FourCc::new(b"aeSN"),
    FourCc::new(b"aeEN"),
];

static INDEX: LazyLock<HashMap<(Category, FourCc), &'static CodeEntry>> = LazyLock::new(|| {
    let core = CORE_CODES.iter().map(|e| ((Category::Core, e.code), e));
    let ssnc = SSNC_CODES
        .iter()
        .map(|e| ((Category::ShairportExtension, e.code), e));
    core.chain(ssnc).collect()
});

/// Look up a code
#[must_use]
pub fn lookup(category: Category, code: FourCc) -> Option<&'static CodeEntry> {
    INDEX.get(&(category, code)).copied()
}

/// Whether a core code belongs in the track info block
#[must_use]
pub fn is_track_field(code: FourCc) -> bool {
    TRACK_INFO_CODES.contains(&code)
}
