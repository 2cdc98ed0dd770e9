use std::sync::Arc;

use lanshare_core::constants::{DOWNLOAD_PATH, FALLBACK_HOST};
use lanshare_core::AppError;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use super::{AddressProvider, LinkEncoder};

/// Characters escaped in the stored-name path segment.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedLink {
    pub download_url: String,
    pub encoded_link: String,
}

/// Builds absolute download URLs and their visual encodings.
#[derive(Clone)]
pub struct LinkGenerator {
    address: Arc<dyn AddressProvider>,
    encoder: Arc<dyn LinkEncoder>,
    port: u16,
}

impl LinkGenerator {
    pub fn new(address: Arc<dyn AddressProvider>, encoder: Arc<dyn LinkEncoder>, port: u16) -> Self {
        Self {
            address,
            encoder,
            port,
        }
    }

    /// Host placed in links, falling back to a loopback name when no LAN address exists.
    pub fn host(&self) -> String {
        self.address
            .local_host()
            .unwrap_or_else(|| FALLBACK_HOST.to_string())
    }

    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host(), self.port)
    }

    pub fn download_url(&self, stored_name: &str) -> String {
        format!(
            "{}{}/{}",
            self.base_url(),
            DOWNLOAD_PATH,
            utf8_percent_encode(stored_name, PATH_SEGMENT)
        )
    }

    pub fn generate(&self, stored_name: &str) -> Result<GeneratedLink, AppError> {
        let download_url = self.download_url(stored_name);
        let encoded_link = self.encoder.encode(&download_url)?;

        Ok(GeneratedLink {
            download_url,
            encoded_link,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::{QrCodeEncoder, StaticAddressProvider};

    fn generator(address: StaticAddressProvider) -> LinkGenerator {
        LinkGenerator::new(Arc::new(address), Arc::new(QrCodeEncoder::default()), 3000)
    }

    #[test]
    fn builds_lan_download_url() {
        let links = generator(StaticAddressProvider::new("192.168.1.20"));
        let link = links.generate("1700000000000_report.pdf").unwrap();

        assert_eq!(
            link.download_url,
            "http://192.168.1.20:3000/download/1700000000000_report.pdf"
        );
        assert!(link.encoded_link.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn falls_back_to_localhost() {
        let links = generator(StaticAddressProvider::unavailable());
        assert_eq!(
            links.download_url("1_a.txt"),
            "http://localhost:3000/download/1_a.txt"
        );
    }

    #[test]
    fn escapes_stored_name_segment() {
        let links = generator(StaticAddressProvider::new("10.0.0.5"));
        assert_eq!(
            links.download_url("1_my report#1?.pdf"),
            "http://10.0.0.5:3000/download/1_my%20report%231%3F.pdf"
        );
        assert_eq!(
            links.download_url("1_文件.txt"),
            "http://10.0.0.5:3000/download/1_%E6%96%87%E4%BB%B6.txt"
        );
    }

    #[test]
    fn generation_is_deterministic() {
        let links = generator(StaticAddressProvider::new("10.0.0.5"));
        assert_eq!(
            links.generate("1_a.txt").unwrap(),
            links.generate("1_a.txt").unwrap()
        );
    }
}
