/// Prefix allowed in front of most tracking keys: a percent-encoded `?`.
pub(crate) const ENCODED_QUERY_MARK: &str = "(?:%3F)?";

/// Value part appended to every tracking key, including a trailing separator.
pub(crate) const TRACKING_VALUE: &str = "=[a-zA-Z0-9_]+&?";

/// Tracking keys, taken from the ClearURLs global rules. Order matters: each
/// rule runs against the output of the previous one.
///
/// The boolean marks whether the key may be prefixed by [`ENCODED_QUERY_MARK`].
pub(crate) const TRACKING_KEYS: &[(&str, bool)] = &[
    ("utm(?:_[a-z_]*)?", true),
    ("ga_[a-z_]+", true),
    ("yclid", true),
    ("_openstat", true),
    ("fb_action_(?:types|ids)", true),
    ("fb_(?:source|ref)", true),
    ("fbclid", true),
    ("action_(?:object|type|ref)_map", true),
    ("gs_l", true),
    ("mkt_tok", true),
    ("hmb_(?:campaign|medium|source)", true),
    ("ref_?", true),
    ("referrer", true),
    ("gclid", true),
    ("otm_[a-z_]*", true),
    ("cmpid", true),
    ("os_ehash", true),
    ("_ga", true),
    ("_gl", true),
    ("__twitter_impression", true),
    ("wt_?z?mc", true),
    ("wtrid", true),
    ("[a-z]?mc", true),
    ("dclid", true),
    ("Echobox", false),
    ("spm", true),
    ("vn(?:_[a-z]*)+", true),
    ("tracking_source", true),
    ("ceneo_spo", true),
];

/// Known redirect and desktop URL shapes, rewritten to their mobile form.
///
/// Word and digit classes are ASCII-only (`(?-u:…)`); Unicode letters or
/// digits in a path never match.
pub(crate) const REDIRECTS: &[(&str, &str)] = &[
    (r"^https://blog.naver.com/((?-u:\w)+)/((?-u:\w)+)", "https://m.blog.naver.com/$1/$2"),
    (
        r"^https://m.blog.naver.com/PostView.naver\?blogId=((?-u:\w)+)&logNo=((?-u:\w)+).*",
        "https://m.blog.naver.com/$1/$2",
    ),
    (r"^https://(.+).tistory.com/((?-u:\d)+)", "https://$1.tistory.com/m/$2"),
    (r"^https://infuture.kr/((?-u:\d)+)", "https://infutureconsulting.tistory.com/m/$1"),
];

/// Passes allowed on top of the length-derived bound, for the redirects.
pub(crate) const PASS_SLACK: usize = 8;

/// Builds the full pattern for a tracking key.
pub(crate) fn tracking_pattern(key: &str, encoded_prefix: bool) -> String {
    let prefix = if encoded_prefix { ENCODED_QUERY_MARK } else { "" };
    format!("{prefix}{key}{TRACKING_VALUE}")
}
