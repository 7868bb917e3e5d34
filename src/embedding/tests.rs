use super::*;
use std::io::Write;
use std::str::FromStr;

fn write_temp(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write");
    file.flush().expect("flush");
    file
}

mod table_tests {
    use super::*;

    #[test]
    fn test_new_rejects_zero_dim() {
        assert!(matches!(
            EmbeddingTable::new(0),
            Err(EmbeddingError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_lookup_hit_and_miss() {
        let table =
            EmbeddingTable::from_entries(2, [("cat", vec![1.0, 0.0]), ("sat", vec![0.0, 1.0])])
                .unwrap();

        assert_eq!(table.get("cat"), Some([1.0, 0.0].as_slice()));
        assert_eq!(table.get("the"), None);
        assert!(table.contains("sat"));
        assert_eq!(table.len(), 2);
        assert_eq!(table.dim(), 2);
    }

    #[test]
    fn test_insert_wrong_width() {
        let mut table = EmbeddingTable::new(3).unwrap();
        let err = table.insert("cat", vec![1.0]).unwrap_err();
        assert!(matches!(
            err,
            EmbeddingError::DimensionMismatch {
                expected: 3,
                actual: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_insert_keeps_first_vector() {
        let mut table = EmbeddingTable::new(1).unwrap();
        assert!(table.insert("cat", vec![1.0]).unwrap());
        assert!(!table.insert("cat", vec![2.0]).unwrap());
        assert_eq!(table.get("cat"), Some([1.0].as_slice()));
    }
}

mod glove_tests {
    use super::*;

    #[test]
    fn test_load_glove_file() {
        let file = write_temp("katze 0.1 0.2 0.3\nhund -1 0 1\n\nhaus 1e-2 2 3\n");
        let table = EmbeddingTable::from_glove_file(file.path(), 3).unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.get("hund"), Some([-1.0, 0.0, 1.0].as_slice()));
        assert_eq!(table.get("haus"), Some([0.01, 2.0, 3.0].as_slice()));
    }

    #[test]
    fn test_load_glove_wrong_width_reports_line() {
        let file = write_temp("katze 0.1 0.2 0.3\nhund 1 2\n");
        let err = EmbeddingTable::from_glove_file(file.path(), 3).unwrap_err();
        assert!(matches!(err, EmbeddingError::MalformedEntry { line: 2, .. }));
    }

    #[test]
    fn test_load_glove_non_numeric() {
        let file = write_temp("katze 0.1 abc 0.3\n");
        let err = EmbeddingTable::from_glove_file(file.path(), 3).unwrap_err();
        assert!(matches!(err, EmbeddingError::MalformedEntry { line: 1, .. }));
        assert!(err.to_string().contains("abc"));
    }

    #[test]
    fn test_load_glove_missing_file() {
        let err = EmbeddingTable::from_glove_file("/definitely/not/here.txt", 3).unwrap_err();
        assert!(matches!(err, EmbeddingError::FileNotFound { .. }));
    }

    #[test]
    fn test_load_glove_empty_file() {
        let file = write_temp("");
        let table = EmbeddingTable::from_glove_file(file.path(), 3).unwrap();
        assert!(table.is_empty());
    }
}

mod device_tests {
    use super::*;
    use candle_core::Device;

    #[test]
    fn test_device_preference_parse() {
        assert_eq!(
            DevicePreference::from_str("CPU").unwrap(),
            DevicePreference::Cpu
        );
        assert_eq!(
            DevicePreference::from_str("auto").unwrap(),
            DevicePreference::Auto
        );
        assert!(DevicePreference::from_str("tpu").is_err());
    }

    #[test]
    fn test_select_cpu_device() {
        let device = select_device(DevicePreference::Cpu).unwrap();
        assert!(matches!(device, Device::Cpu));
        assert_eq!(device_label(&device), "cpu");
    }
}
