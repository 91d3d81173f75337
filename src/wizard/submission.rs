//! Locally issued submission receipts

use super::models::FormData;
use crate::capture::models::Capture;
use crate::location::models::Coordinates;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Everything the citizen submitted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplaintRecord {
    pub form: FormData,
    pub photos: Vec<Capture>,
    /// Resolved map position, when location detection ran
    pub coordinates: Option<Coordinates>,
}

/// Issued on terminal submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplaintReceipt {
    pub complaint_id: String,
    pub submitted_at: DateTime<Utc>,
    pub record: ComplaintRecord,
}

impl ComplaintReceipt {
    pub fn issue(record: ComplaintRecord) -> Self {
        Self {
            complaint_id: ticket_id(&mut rand::thread_rng()),
            submitted_at: Utc::now(),
            record,
        }
    }
}

/// `CIV-` followed by four digits
pub fn ticket_id<R: Rng>(rng: &mut R) -> String {
    format!("CIV-{}", rng.gen_range(1000..=9999))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_ticket_id_format() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let id = ticket_id(&mut rng);
            let digits = id.strip_prefix("CIV-").unwrap();
            assert_eq!(digits.len(), 4);
            assert!(digits.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_issue_keeps_record() {
        let record = ComplaintRecord {
            form: FormData {
                category: "Water".into(),
                ..FormData::default()
            },
            photos: vec![],
            coordinates: Some(Coordinates::new(20.0, 78.0)),
        };
        let receipt = ComplaintReceipt::issue(record.clone());
        assert_eq!(receipt.record, record);
        assert!(receipt.complaint_id.starts_with("CIV-"));
    }
}
