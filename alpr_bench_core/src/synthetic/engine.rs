use crc32fast::Hasher;

use crate::fast_hash;
use crate::stream::{
    Frame, PlateCandidate, PlateGroup, RecognitionEngine, VehicleClassification,
    VehicleClassifier,
};
use crate::{BenchError, Result};

const PLATE_ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const PLATE_LENGTH: usize = 7;
const VEHICLE_LABELS: [&str; 5] = ["sedan", "suv", "truck", "van", "motorcycle"];

fn plate_from_checksum(mut checksum: u32) -> String {
    let mut plate = String::with_capacity(PLATE_LENGTH);
    for _ in 0..PLATE_LENGTH {
        plate.push(PLATE_ALPHABET[(checksum % 36) as usize] as char);
        checksum /= 36;
        if checksum == 0 {
            checksum = 0x9e37_79b9;
        }
    }
    plate
}

fn confidence_from_checksum(checksum: u32) -> f32 {
    80.0 + (checksum % 2000) as f32 / 100.0
}

/// Burns CPU proportional to the frame size and derives a stable plate from it.
pub struct SyntheticEngine {
    locale: String,
    work_rounds: u32,
}

impl SyntheticEngine {
    pub fn new(locale: &str, work_rounds: u32) -> Self {
        Self {
            locale: locale.to_string(),
            work_rounds: work_rounds.max(1),
        }
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    fn checksum(&self, data: &[u8]) -> u32 {
        let mut checksum = fast_hash(data);
        for _ in 1..self.work_rounds {
            let mut hasher = Hasher::new_with_initial(checksum);
            hasher.update(data);
            checksum = hasher.finalize();
        }
        checksum
    }
}

impl RecognitionEngine for SyntheticEngine {
    fn recognize(&mut self, frame: &Frame) -> Result<Vec<PlateCandidate>> {
        if frame.data.is_empty() {
            return Err(BenchError::Engine(format!("frame {} is empty", frame.index)));
        }
        let checksum = self.checksum(&frame.data);
        Ok(vec![PlateCandidate {
            plate: plate_from_checksum(checksum),
            confidence: confidence_from_checksum(checksum),
        }])
    }
}

pub struct SyntheticClassifier;

impl VehicleClassifier for SyntheticClassifier {
    fn classify(&mut self, group: &PlateGroup) -> Result<VehicleClassification> {
        let checksum = fast_hash(group.plate.as_bytes());
        Ok(VehicleClassification {
            group: group.clone(),
            label: VEHICLE_LABELS[checksum as usize % VEHICLE_LABELS.len()].to_string(),
            confidence: confidence_from_checksum(checksum.rotate_left(7)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(data: &[u8]) -> Frame {
        Frame {
            index: 3,
            data: data.to_vec(),
        }
    }

    #[test]
    fn recognition_is_deterministic() {
        let mut a = SyntheticEngine::new("us", 3);
        let mut b = SyntheticEngine::new("eu", 3);
        let first = a.recognize(&frame(b"payload")).unwrap();
        let second = b.recognize(&frame(b"payload")).unwrap();
        assert_eq!(first, second);
        assert_eq!(first[0].plate.len(), PLATE_LENGTH);
        assert!(first[0]
            .plate
            .bytes()
            .all(|c| PLATE_ALPHABET.contains(&c)));
        assert!((80.0..100.0).contains(&first[0].confidence));
        assert_eq!(b.locale(), "eu");
    }

    #[test]
    fn work_rounds_change_the_checksum() {
        let one = SyntheticEngine::new("us", 1).checksum(b"payload");
        let two = SyntheticEngine::new("us", 2).checksum(b"payload");
        assert_eq!(one, fast_hash(b"payload"));
        assert_ne!(one, two);
    }

    #[test]
    fn empty_frame_is_an_error() {
        let mut engine = SyntheticEngine::new("us", 1);
        assert!(matches!(
            engine.recognize(&frame(b"")),
            Err(BenchError::Engine(_))
        ));
    }

    #[test]
    fn classifier_labels_by_plate() {
        let group = PlateGroup {
            plate: "ABC1234".to_string(),
            confidence: 90.0,
            first_frame: 0,
            last_frame: 4,
        };
        let first = SyntheticClassifier.classify(&group).unwrap();
        let second = SyntheticClassifier.classify(&group).unwrap();
        assert_eq!(first, second);
        assert!(VEHICLE_LABELS.contains(&first.label.as_str()));
        assert_eq!(first.group, group);
    }
}
