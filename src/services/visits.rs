//! Per-plate visit numbering

use crate::domain::trip::{RefinedTrip, VisitRecord};

/// Sort trips by plate then entry time and number them 1..N within each plate
pub fn number_visits(mut trips: Vec<RefinedTrip>) -> Vec<VisitRecord> {
    trips.sort_by(|a, b| a.plate.cmp(&b.plate).then(a.entry.cmp(&b.entry)));

    let mut records: Vec<VisitRecord> = Vec::with_capacity(trips.len());
    for trip in trips {
        let visit_index = match records.last() {
            Some(last) if last.trip.plate == trip.plate => last.visit_index + 1,
            _ => 1,
        };
        records.push(VisitRecord { visit_index, trip });
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::trip::Trip;
    use crate::domain::types::{parse_timestamp, ScanEvent};

    fn refined(plate: &str, ts: &str) -> RefinedTrip {
        Trip::open(&ScanEvent::new(plate, "1", parse_timestamp(ts).unwrap(), "N")).into()
    }

    #[test]
    fn test_number_visits() {
        let trips = vec![
            refined("BBB222", "2024-03-01 09:00:00"),
            refined("AAA111", "2024-03-01 12:00:00"),
            refined("AAA111", "2024-03-01 08:00:00"),
            refined("BBB222", "2024-03-01 07:00:00"),
            refined("AAA111", "2024-03-01 10:00:00"),
        ];

        let records = number_visits(trips);

        let summary: Vec<(&str, u32, String)> = records
            .iter()
            .map(|r| (r.trip.plate.as_str(), r.visit_index, r.trip.entry.format("%H").to_string()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("AAA111", 1, "08".to_string()),
                ("AAA111", 2, "10".to_string()),
                ("AAA111", 3, "12".to_string()),
                ("BBB222", 1, "07".to_string()),
                ("BBB222", 2, "09".to_string()),
            ]
        );
    }

    #[test]
    fn test_number_visits_empty() {
        assert!(number_visits(Vec::new()).is_empty());
    }
}
