//! Favicon URLs from an external service keyed by hostname.
//!
//! Nothing here can fail visibly: unparsable URLs and failed image loads both end up at [`FALLBACK_ICON`].

use crate::error::Error;
use tracing::debug;
use url::Url;

/// A neutral grey globe, shown whenever the service has no icon.
pub const FALLBACK_ICON: &str = "data:image/svg+xml,%3Csvg%20xmlns='http://www.w3.org/2000/svg'%20viewBox='0%200%2024%2024'%20width='24'%20height='24'%3E%3Ccircle%20cx='12'%20cy='12'%20r='10'%20fill='none'%20stroke='%23d0d0d0'%20stroke-width='2'/%3E%3Cpath%20d='M2%2012h20M12%202c3%203%203%2017%200%2020M12%202c-3%203-3%2017%200%2020'%20fill='none'%20stroke='%23d0d0d0'%20stroke-width='2'/%3E%3C/svg%3E";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaviconService {
	template: String,
	size: u32,
}
impl FaviconService {
	/// `template` may contain `{host}` and `{size}` placeholders.
	pub fn new(template: impl Into<String>, size: u32) -> Self {
		Self { template: template.into(), size }
	}

	#[must_use]
	pub fn size(&self) -> u32 {
		self.size
	}

	#[must_use]
	pub fn icon_url(&self, host: &str) -> String {
		self.template.replace("{host}", host).replace("{size}", &self.size.to_string())
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Favicon {
	Remote(String),
	Fallback,
}
impl Favicon {
	#[must_use]
	pub fn src(&self) -> &str {
		match self {
			Favicon::Remote(src) => src,
			Favicon::Fallback => FALLBACK_ICON,
		}
	}
}

/// The hostname of `link_url`.
///
/// # Errors
///
/// [`Error::FaviconLoadFailed`] if `link_url` is not an absolute URL with a host.
pub fn hostname(link_url: &str) -> Result<String, Error> {
	Url::parse(link_url.trim())
		.ok()
		.and_then(|parsed| parsed.host_str().map(str::to_owned))
		.ok_or_else(|| Error::FaviconLoadFailed { url: link_url.to_owned() })
}

#[must_use]
pub fn resolve(link_url: &str, service: &FaviconService) -> Favicon {
	match hostname(link_url) {
		Ok(host) => Favicon::Remote(service.icon_url(&host)),
		Err(_error) => {
			#[cfg(feature = "dangerous-logging")]
			debug!("{}", _error);
			#[cfg(not(feature = "dangerous-logging"))]
			debug!("Link URL has no hostname. Using the fallback icon.");
			Favicon::Fallback
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn google() -> FaviconService {
		FaviconService::new("https://www.google.com/s2/favicons?domain={host}&sz={size}", 24)
	}

	#[test]
	fn keyed_by_hostname() {
		assert_eq!(resolve("https://go.dev/doc/effective_go", &google()), Favicon::Remote("https://www.google.com/s2/favicons?domain=go.dev&sz=24".to_owned()));
	}

	#[test]
	fn ports_and_credentials_are_not_part_of_the_key() {
		assert_eq!(hostname("http://user:pw@localhost:8080/x").unwrap(), "localhost");
	}

	#[test]
	fn relative_or_garbage_urls_fall_back() {
		assert_eq!(resolve("rust-lang.org", &google()), Favicon::Fallback);
		assert_eq!(resolve("", &google()).src(), FALLBACK_ICON);
	}
}
