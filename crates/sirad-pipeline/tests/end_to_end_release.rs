//! Runs the full split -> resolve -> release chain over two datasets that
//! share one person by SSN, and checks that the person's two research rows
//! carry the same `sirad_id` even though it's derived independently per
//! dataset and the pii/link files sit between them.

use std::fs;
use std::io::Write as _;

use sirad_core::Config;
use sirad_layout::parse_layout;
use sirad_pipeline::{load_pii_rows, process_dataset, resolve, write_release, PiiRow};

fn write_raw(dir: &std::path::Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    let mut f = fs::File::create(&path).unwrap();
    f.write_all(contents.as_bytes()).unwrap();
    path
}

fn tax_layout() -> sirad_layout::Dataset {
    parse_layout(
        "tax",
        r#"
source: tax.csv
header: true
fields:
  - ID
  - LAST_NAME:
      pii: true
  - FIRST_NAME:
      pii: true
  - DOB:
      pii: true
      type: date
      format: "%Y-%m-%d"
  - SSN:
      pii: true
      ssn: true
  - JOB
  - SALARY
"#,
    )
    .unwrap()
}

fn credit_layout() -> sirad_layout::Dataset {
    parse_layout(
        "credit",
        r#"
source: credit.csv
header: true
fields:
  - ID
  - LAST_NAME:
      pii: true
  - FIRST_NAME:
      pii: true
  - DOB:
      pii: true
      type: date
      format: "%Y-%m-%d"
  - SSN:
      pii: true
      ssn: true
  - SCORE
"#,
    )
    .unwrap()
}

#[test]
fn shared_identity_gets_the_same_sirad_id_across_datasets() {
    let root = tempfile::tempdir().unwrap();
    let raw_dir = root.path().join("raw");
    fs::create_dir_all(&raw_dir).unwrap();

    write_raw(
        &raw_dir,
        "tax.csv",
        "ID,LAST_NAME,FIRST_NAME,DOB,SSN,JOB,SALARY\n\
         1,Smith,Jane,1970-03-02,123-45-6789,cook,45000\n",
    );
    write_raw(
        &raw_dir,
        "credit.csv",
        "ID,LAST_NAME,FIRST_NAME,DOB,SSN,SCORE\n\
         1,Smith,Jane,1970-03-02,123-45-6789,700\n",
    );

    let mut cfg = Config::default();
    cfg.raw_dir = raw_dir.clone();
    cfg.data_dir = root.path().join("data");
    cfg.pii_dir = root.path().join("pii");
    cfg.link_dir = root.path().join("link");
    cfg.research_dir = root.path().join("research");
    cfg.process_log = root.path().join("data").join("sirad.log");

    let tax = tax_layout();
    let credit = credit_layout();

    let tax_outcome = process_dataset(&tax, &cfg, &raw_dir.join("tax.csv"), Some(1)).unwrap();
    let credit_outcome = process_dataset(&credit, &cfg, &raw_dir.join("credit.csv"), Some(1)).unwrap();
    assert_eq!(tax_outcome.nrows, 1);
    assert_eq!(credit_outcome.nrows, 1);

    let mut pii_rows: Vec<PiiRow> = Vec::new();
    pii_rows.extend(load_pii_rows(&tax, tax_outcome.pii_path.as_ref().unwrap()).unwrap());
    pii_rows.extend(load_pii_rows(&credit, credit_outcome.pii_path.as_ref().unwrap()).unwrap());

    let resolved = resolve(pii_rows, Some(7));

    for (dataset, outcome) in [(&tax, &tax_outcome), (&credit, &credit_outcome)] {
        let link_rows = read_link_rows(outcome.link_path.as_ref().unwrap());
        let sirad_ids: std::collections::HashMap<u64, u64> = resolved
            .sirad_ids
            .iter()
            .filter(|((dsn, _), _)| dsn == &dataset.name)
            .map(|((_, pii_id), sirad_id)| (*pii_id, *sirad_id))
            .collect();
        write_release(dataset, &cfg, &outcome.data_path, Some(&link_rows), Some(&sirad_ids)).unwrap();
    }

    let tax_research = fs::read_to_string(
        sirad_fs::output_path(&cfg.research_dir, &cfg.project, cfg.version, "tax").unwrap(),
    )
    .unwrap();
    let credit_research = fs::read_to_string(
        sirad_fs::output_path(&cfg.research_dir, &cfg.project, cfg.version, "credit").unwrap(),
    )
    .unwrap();

    let tax_id = research_sirad_id(&tax_research);
    let credit_id = research_sirad_id(&credit_research);
    assert!(tax_id >= 1);
    assert_eq!(tax_id, credit_id);
}

fn read_link_rows(path: &std::path::Path) -> Vec<(u64, u64)> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'|')
        .from_path(path)
        .unwrap();
    reader
        .records()
        .map(|r| {
            let r = r.unwrap();
            (r.get(0).unwrap().parse().unwrap(), r.get(1).unwrap().parse().unwrap())
        })
        .collect()
}

fn research_sirad_id(contents: &str) -> u64 {
    let mut lines = contents.lines();
    let header = lines.next().unwrap();
    assert!(header.starts_with("sirad_id|"));
    let row = lines.next().unwrap();
    row.split('|').next().unwrap().parse().unwrap()
}
