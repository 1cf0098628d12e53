mod url;

pub(crate) use self::url::UrlRow;
