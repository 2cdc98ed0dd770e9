use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Metadata for one live upload. Immutable once appended to the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: Uuid,
    /// Display name as sent by the client, after filename decoding.
    pub original_name: String,
    /// On-disk key, `<millis>_<name>`.
    pub stored_name: String,
    pub size_bytes: u64,
    pub uploaded_at: DateTime<Utc>,
    pub download_url: String,
    /// `data:image/png;base64,...` QR code of `download_url`.
    pub encoded_link: String,
}

impl FileRecord {
    pub fn expires_at(&self, retention: Duration) -> DateTime<Utc> {
        self.uploaded_at + retention
    }

    /// A record is expired once its age strictly exceeds the retention window.
    pub fn is_expired(&self, now: DateTime<Utc>, retention: Duration) -> bool {
        now - self.uploaded_at > retention
    }

    pub fn to_response(&self, retention: Duration) -> FileResponse {
        FileResponse {
            id: self.id,
            original_name: self.original_name.clone(),
            size: self.size_bytes,
            size_formatted: format_file_size(self.size_bytes),
            upload_time: self.uploaded_at,
            expires_at: self.expires_at(retention),
            download_url: self.download_url.clone(),
            encoded_link: self.encoded_link.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileResponse {
    pub id: Uuid,
    pub original_name: String,
    pub size: u64,
    #[schema(example = "4.88 KB")]
    pub size_formatted: String,
    pub upload_time: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub download_url: String,
    pub encoded_link: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    pub success: bool,
    pub file: FileResponse,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ListFilesResponse {
    pub success: bool,
    pub files: Vec<FileResponse>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub files: usize,
}

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Human-readable size using 1024-based units and at most two decimals, trailing zeros dropped.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut unit = 0;
    let mut value = bytes as f64;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 100.0).round() / 100.0;
    let mut text = format!("{:.2}", rounded);
    while text.ends_with('0') {
        text.pop();
    }
    if text.ends_with('.') {
        text.pop();
    }

    format!("{} {}", text, SIZE_UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_uploaded_at(uploaded_at: DateTime<Utc>) -> FileRecord {
        FileRecord {
            id: Uuid::new_v4(),
            original_name: "report.pdf".to_string(),
            stored_name: "1700000000000_report.pdf".to_string(),
            size_bytes: 5000,
            uploaded_at,
            download_url: "http://192.168.1.20:3000/download/1700000000000_report.pdf".to_string(),
            encoded_link: "data:image/png;base64,AAAA".to_string(),
        }
    }

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(512), "512 Bytes");
        assert_eq!(format_file_size(1024), "1 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(5000), "4.88 KB");
        assert_eq!(format_file_size(100 * 1024 * 1024), "100 MB");
        assert_eq!(format_file_size(3 * 1024 * 1024 * 1024), "3 GB");
    }

    #[test]
    fn test_expiry_is_strictly_after_retention() {
        let retention = Duration::hours(24);
        let uploaded_at = Utc::now();
        let record = record_uploaded_at(uploaded_at);

        assert!(!record.is_expired(uploaded_at + Duration::hours(23), retention));
        assert!(!record.is_expired(uploaded_at + retention, retention));
        assert!(record.is_expired(
            uploaded_at + retention + Duration::milliseconds(1),
            retention
        ));
        assert_eq!(record.expires_at(retention), uploaded_at + retention);
    }

    #[test]
    fn test_response_serializes_camel_case_without_stored_name() {
        let record = record_uploaded_at(Utc::now());
        let json = serde_json::to_value(record.to_response(Duration::hours(24))).unwrap();

        assert_eq!(json["originalName"], "report.pdf");
        assert_eq!(json["size"], 5000);
        assert_eq!(json["sizeFormatted"], "4.88 KB");
        assert!(json["uploadTime"].is_string());
        assert!(json["downloadUrl"]
            .as_str()
            .unwrap()
            .ends_with("/download/1700000000000_report.pdf"));
        assert!(json.get("storedName").is_none());
        assert!(json.get("stored_name").is_none());
    }
}
