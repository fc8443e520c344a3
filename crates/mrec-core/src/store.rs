//! CSV-backed record store
//!
//! Everything lives in memory; the file is only touched by `load` and `save`.

use crate::{Error, LoadPolicy, Record, Result, csv_codec};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tracing::{debug, warn};

/// Ordered record collection plus the identifier counter
#[derive(Debug, Default)]
pub struct Store {
    records: Vec<Record>,
    last_id: u64,
    policy: LoadPolicy,
}

impl Store {
    /// Create an empty store using the default load policy
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store with the given load policy
    pub fn with_policy(policy: LoadPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Open the store backed by `path`
    ///
    /// A missing file yields an empty store.
    pub fn open(path: &Path, policy: LoadPolicy) -> Result<Self> {
        let mut store = Self::with_policy(policy);
        if path.exists() {
            store.load(path)?;
        }
        Ok(store)
    }

    /// Policy applied to malformed rows by `load`
    pub fn policy(&self) -> LoadPolicy {
        self.policy
    }

    /// Highest identifier handed out so far
    pub fn last_id(&self) -> u64 {
        self.last_id
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in insertion order
    pub fn list(&self) -> &[Record] {
        &self.records
    }

    /// Get a record by ID
    pub fn get(&self, id: u64) -> Option<&Record> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Append a new record with the next identifier
    pub fn create(&mut self, source: String, measurement: f64, event: String) -> &Record {
        self.last_id += 1;
        self.records
            .push(Record::new(self.last_id, source, measurement, event));
        &self.records[self.records.len() - 1]
    }

    /// Overwrite source, measurement and event of an existing record
    pub fn update(
        &mut self,
        id: u64,
        source: String,
        measurement: f64,
        event: String,
    ) -> Result<&Record> {
        let record = self
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(Error::NotFound(id))?;
        record.set_fields(source, measurement, event);
        Ok(record)
    }

    /// Remove the first record with this ID
    ///
    /// The counter is left alone, so the ID is never handed out again.
    pub fn delete(&mut self, id: u64) -> Result<Record> {
        let pos = self
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or(Error::NotFound(id))?;
        Ok(self.records.remove(pos))
    }

    /// Remove every record and restart numbering at 1
    pub fn delete_all(&mut self) {
        self.records.clear();
        self.last_id = 0;
    }

    /// Write all records to `path`, replacing any existing file
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(BufWriter::new(file));

        for record in &self.records {
            writer.write_record(csv_codec::encode_row(record))?;
        }

        writer.flush()?;
        debug!(path = %path.display(), count = self.records.len(), "saved records");
        Ok(())
    }

    /// Replace the collection with the contents of `path`
    ///
    /// The store is untouched if the load fails.
    pub fn load(&mut self, path: &Path) -> Result<()> {
        let file = File::open(path)?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(BufReader::new(file));

        let mut records: Vec<Record> = Vec::new();
        for (idx, row) in reader.records().enumerate() {
            let row = row?;
            if let Some(record) = csv_codec::decode_row(&row, idx + 1, self.policy)? {
                if records.iter().any(|r| r.id == record.id) {
                    warn!(id = record.id, "duplicate record id in file");
                }
                records.push(record);
            }
        }

        self.last_id = records.iter().map(|r| r.id).max().unwrap_or(0);
        self.records = records;
        debug!(path = %path.display(), count = self.records.len(), last_id = self.last_id, "loaded records");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn sample() -> Store {
        let mut store = Store::new();
        store.create("Source1".into(), 10.5, "Event1".into());
        store.create("Source2".into(), 20.0, "Event2".into());
        store
    }

    fn ids(store: &Store) -> Vec<u64> {
        store.list().iter().map(|r| r.id).collect()
    }

    fn data_file(dir: &tempfile::TempDir) -> PathBuf {
        dir.path().join("data.csv")
    }

    #[test]
    fn test_create_assigns_sequential_ids() {
        let mut store = Store::new();
        for i in 0..5 {
            store.create(format!("s{}", i), i as f64, "e".into());
        }
        assert_eq!(ids(&store), vec![1, 2, 3, 4, 5]);
        assert_eq!(store.list()[3].source, "s3");
        assert_eq!(store.last_id(), 5);
    }

    #[test]
    fn test_update_changes_only_mutable_fields() {
        let mut store = sample();
        let before = store.get(2).unwrap().clone();

        store
            .update(2, "UpdatedSource".into(), 15.0, "UpdatedEvent".into())
            .unwrap();

        let after = store.get(2).unwrap();
        assert_eq!(after.id, before.id);
        assert_eq!(after.timestamp, before.timestamp);
        assert_eq!(after.source, "UpdatedSource");
        assert_eq!(after.measurement, 15.0);
        assert_eq!(after.event, "UpdatedEvent");
        assert_eq!(store.get(1).unwrap().source, "Source1");
    }

    #[test]
    fn test_update_missing_id() {
        let mut store = sample();
        let before = store.list().to_vec();

        let err = store.update(9, "x".into(), 1.0, "y".into()).unwrap_err();

        assert!(matches!(err, Error::NotFound(9)));
        assert_eq!(store.list(), before.as_slice());
    }

    #[test]
    fn test_delete_preserves_order() {
        let mut store = Store::new();
        for _ in 0..4 {
            store.create("s".into(), 1.0, "e".into());
        }

        let removed = store.delete(2).unwrap();

        assert_eq!(removed.id, 2);
        assert_eq!(ids(&store), vec![1, 3, 4]);
    }

    #[test]
    fn test_delete_missing_id() {
        let mut store = sample();
        assert!(matches!(store.delete(3), Err(Error::NotFound(3))));
        assert_eq!(ids(&store), vec![1, 2]);
    }

    #[test]
    fn test_delete_does_not_reuse_ids() {
        let mut store = sample();
        store.delete(2).unwrap();
        let id = store.create("s".into(), 0.0, "e".into()).id;
        assert_eq!(id, 3);
    }

    #[test]
    fn test_delete_all_resets_counter() {
        let mut store = sample();
        store.delete_all();
        assert!(store.is_empty());
        assert_eq!(store.last_id(), 0);
        assert_eq!(store.create("s".into(), 0.0, "e".into()).id, 1);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = data_file(&dir);
        let store = sample();
        store.save(&path).unwrap();

        let mut loaded = Store::new();
        loaded.load(&path).unwrap();

        assert_eq!(loaded.list(), store.list());
        assert_eq!(loaded.last_id(), 2);
    }

    #[test]
    fn test_round_trip_quoted_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = data_file(&dir);
        let mut store = Store::new();
        store.create("lab, bench \"3\"".into(), -0.000125, "line\nbreak".into());
        store.create(String::new(), 1e21, String::new());
        store.save(&path).unwrap();

        let loaded = Store::open(&path, LoadPolicy::Reject).unwrap();
        assert_eq!(loaded.list(), store.list());
    }

    #[test]
    fn test_save_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = data_file(&dir);
        let store = sample();
        store.save(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with(",1,Source1,10.5,Event1"));
        assert!(lines[1].ends_with(",2,Source2,20,Event2"));
    }

    #[test]
    fn test_save_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = data_file(&dir);
        sample().save(&path).unwrap();

        let mut store = Store::new();
        store.create("only".into(), 1.0, "one".into());
        store.save(&path).unwrap();

        let loaded = Store::open(&path, LoadPolicy::default()).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.list()[0].source, "only");
    }

    #[test]
    fn test_save_to_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("data.csv");
        assert!(matches!(sample().save(&path), Err(Error::Io(_))));
    }

    #[test]
    fn test_load_sets_counter_to_max_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = data_file(&dir);
        std::fs::write(
            &path,
            "2024-01-01T00:00:00Z,7,a,1,x\n2024-01-01T00:00:01Z,3,b,2,y\n",
        )
        .unwrap();

        let mut store = Store::open(&path, LoadPolicy::default()).unwrap();

        assert_eq!(ids(&store), vec![7, 3]);
        assert_eq!(store.last_id(), 7);
        assert_eq!(store.create("c".into(), 3.0, "z".into()).id, 8);
    }

    #[test]
    fn test_load_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = data_file(&dir);
        std::fs::write(&path, "").unwrap();

        let mut store = sample();
        store.load(&path).unwrap();

        assert!(store.is_empty());
        assert_eq!(store.last_id(), 0);
    }

    #[test]
    fn test_load_zero_fills_bad_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = data_file(&dir);
        std::fs::write(&path, "garbage,x,a,NaN?,e\n2024-01-01T00:00:00Z,4,b,2.5,f\n").unwrap();

        let store = Store::open(&path, LoadPolicy::ZeroFill).unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.list()[0].id, 0);
        assert_eq!(store.list()[0].measurement, 0.0);
        assert_eq!(store.list()[0].source, "a");
        assert_eq!(store.last_id(), 4);
    }

    #[test]
    fn test_load_skips_bad_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = data_file(&dir);
        std::fs::write(&path, "garbage,x,a,1,e\n2024-01-01T00:00:00Z,4,b,2.5,f\n").unwrap();

        let store = Store::open(&path, LoadPolicy::Skip).unwrap();

        assert_eq!(ids(&store), vec![4]);
    }

    #[test]
    fn test_save_write_failure_is_io() {
        let full = Path::new("/dev/full");
        if !full.exists() {
            return;
        }
        let mut store = Store::new();
        for i in 0..10_000 {
            store.create(format!("source-{}", i), i as f64, "event".into());
        }
        assert!(matches!(store.save(full), Err(Error::Io(_))));
    }

    #[test]
    fn test_load_huge_id_then_create() {
        let dir = tempfile::tempdir().unwrap();
        let path = data_file(&dir);
        std::fs::write(
            &path,
            "2024-01-01T00:00:00Z,18446744073709551615,a,1,x\n2024-01-01T00:00:01Z,5,b,2,y\n",
        )
        .unwrap();

        assert!(matches!(
            Store::open(&path, LoadPolicy::Reject),
            Err(Error::Malformed { row: 1, field: "id" })
        ));

        let mut skipped = Store::open(&path, LoadPolicy::Skip).unwrap();
        assert_eq!(ids(&skipped), vec![5]);
        assert_eq!(skipped.create("c".into(), 3.0, "z".into()).id, 6);

        let mut filled = Store::open(&path, LoadPolicy::ZeroFill).unwrap();
        assert_eq!(ids(&filled), vec![0, 5]);
        assert_eq!(filled.create("c".into(), 3.0, "z".into()).id, 6);
    }

    #[test]
    fn test_load_unreadable_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = data_file(&dir);
        std::fs::write(&path, b"2024-01-01T00:00:00Z,4,a\xff,1,x\n").unwrap();

        let mut store = sample();
        let err = store.load(&path).unwrap_err();

        assert!(matches!(err, Error::Csv(_)));
        assert_eq!(store.len(), 2);
        assert_eq!(store.last_id(), 2);
    }

    #[test]
    fn test_failed_load_keeps_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = data_file(&dir);
        std::fs::write(&path, "2024-01-01T00:00:00Z,4,b,oops,f\n").unwrap();

        let mut store = Store::with_policy(LoadPolicy::Reject);
        store.create("kept".into(), 1.0, "e".into());

        let err = store.load(&path).unwrap_err();

        assert!(matches!(err, Error::Malformed { row: 1, field: "measurement" }));
        assert_eq!(store.len(), 1);
        assert_eq!(store.last_id(), 1);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = sample();
        assert!(matches!(store.load(&data_file(&dir)), Err(Error::Io(_))));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_open_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(&data_file(&dir), LoadPolicy::Skip).unwrap();
        assert!(store.is_empty());
        assert_eq!(store.policy(), LoadPolicy::Skip);
    }

    #[test]
    fn test_crud_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let path = data_file(&dir);
        let mut store = sample();

        let listed: Vec<_> = store
            .list()
            .iter()
            .map(|r| (r.id, r.source.as_str(), r.measurement, r.event.as_str()))
            .collect();
        assert_eq!(
            listed,
            vec![(1, "Source1", 10.5, "Event1"), (2, "Source2", 20.0, "Event2")]
        );

        store.save(&path).unwrap();
        store.load(&path).unwrap();
        assert_eq!(store.len(), 2);

        store
            .update(2, "UpdatedSource".into(), 15.0, "UpdatedEvent".into())
            .unwrap();
        assert_eq!(store.list()[0].source, "Source1");
        assert_eq!(store.list()[1].source, "UpdatedSource");

        store.delete(1).unwrap();
        assert_eq!(ids(&store), vec![2]);

        store.delete_all();
        assert!(store.is_empty());
    }
}
