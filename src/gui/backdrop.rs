use gdk_pixbuf::{Pixbuf, PixbufError, PixbufLoader};
use gdk_pixbuf::prelude::*;
use reqwest::Url;
use skiphire::Postcode;

const STATIC_MAP_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/staticmap";

/// Static map centred on the postcode, or `None` without a usable key.
pub fn static_map_url(api_key: Option<&str>, postcode: &Postcode) -> Option<Url> {
    let key = api_key.map(str::trim).filter(|k| !k.is_empty())?;
    Url::parse_with_params(
        STATIC_MAP_ENDPOINT,
        &[
            ("center", postcode.as_str()),
            ("zoom", "17"),
            ("size", "600x400"),
            ("key", key),
        ],
    )
    .ok()
}

/// Decodes downloaded image bytes (JPEG, PNG, ...) on the GTK thread.
pub fn decode_pixbuf(bytes: &[u8]) -> Result<Pixbuf, glib::Error> {
    let loader = PixbufLoader::new();
    loader.write(bytes)?;
    loader.close()?;
    loader
        .pixbuf()
        .ok_or_else(|| glib::Error::new(PixbufError::CorruptImage, "no image data"))
}
