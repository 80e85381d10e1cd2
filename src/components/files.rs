//! Browser file plumbing: downloads through a temporary anchor, uploads
//! through `FileReader` and object URLs.

use wasm_bindgen::prelude::*;
use web_sys::{Blob, BlobPropertyBag, File, FileReader, HtmlAnchorElement, HtmlImageElement, Url};

/// Offer `text` as a JSON file download.
pub fn download_json(filename: &str, text: &str) -> Result<(), JsValue> {
	let parts = js_sys::Array::of1(&JsValue::from_str(text));
	let options = BlobPropertyBag::new();
	options.set_type("application/json");
	let blob = Blob::new_with_str_sequence_and_options(&parts, &options)?;
	let url = Url::create_object_url_with_blob(&blob)?;

	let document = web_sys::window()
		.and_then(|w| w.document())
		.ok_or_else(|| JsValue::from_str("no document"))?;
	let link: HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
	link.set_href(&url);
	link.set_download(filename);
	let body = document.body().ok_or_else(|| JsValue::from_str("no body"))?;
	body.append_child(&link)?;
	link.click();
	body.remove_child(&link)?;
	Url::revoke_object_url(&url)
}

/// Read `file` as UTF-8 text and hand the result to `on_done`.
pub fn read_text(
	file: &File,
	on_done: impl FnOnce(Result<String, String>) + 'static,
) -> Result<(), JsValue> {
	let reader = FileReader::new()?;
	let reader_cb = reader.clone();
	let onload = Closure::once_into_js(move || {
		let text = reader_cb
			.result()
			.ok()
			.and_then(|v| v.as_string())
			.ok_or_else(|| "file is not text".to_string());
		on_done(text);
	});
	reader.set_onload(Some(onload.unchecked_ref()));
	reader.read_as_text(file)
}

/// Decode `file` as an image. `on_load` receives the element and the object
/// URL it was loaded from once the pixel size is known.
pub fn load_image(
	file: &File,
	on_load: impl FnOnce(HtmlImageElement, String) + 'static,
) -> Result<(), JsValue> {
	let url = Url::create_object_url_with_blob(file)?;
	let image = HtmlImageElement::new()?;
	let (image_cb, url_cb) = (image.clone(), url.clone());
	let onload = Closure::once_into_js(move || on_load(image_cb, url_cb));
	image.set_onload(Some(onload.unchecked_ref()));
	image.set_src(&url);
	Ok(())
}

/// The object URL `next` replaces, if it is a different one.
pub fn superseded_url(previous: Option<String>, next: Option<&str>) -> Option<String> {
	previous.filter(|old| Some(old.as_str()) != next)
}

/// Release an object URL made by [`load_image`].
pub fn revoke_url(url: &str) {
	if let Err(err) = Url::revoke_object_url(url) {
		log::warn!("could not revoke {url}: {err:?}");
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn replaced_and_cleared_urls_are_superseded() {
		let old = Some("blob:a".to_string());
		assert_eq!(superseded_url(old.clone(), Some("blob:b")), old);
		assert_eq!(superseded_url(old.clone(), None), old);
	}

	#[test]
	fn same_or_missing_url_is_kept() {
		assert_eq!(superseded_url(Some("blob:a".into()), Some("blob:a")), None);
		assert_eq!(superseded_url(None, Some("blob:a")), None);
	}
}
