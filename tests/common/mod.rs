use std::fs;
use std::path::{Path, PathBuf};

pub struct Dataset {
    pub evidence: PathBuf,
    pub targets: PathBuf,
    pub diseases: PathBuf,
    pub output: PathBuf,
}

/// Writes the two-target, three-disease reference data set under `root`.
pub fn write_reference_dataset(root: &Path) -> Dataset {
    let dataset = Dataset {
        evidence: root.join("evidence"),
        targets: root.join("targets"),
        diseases: root.join("diseases"),
        output: root.join("output"),
    };
    for dir in [&dataset.evidence, &dataset.targets, &dataset.diseases] {
        fs::create_dir_all(dir).expect("create input directory");
    }

    let evidence = [
        ("T1", "D1", "0.0"),
        ("T1", "D1", "1.0"),
        ("T1", "D1", "2.0"),
        ("T1", "D2", "0.0"),
        ("T1", "D2", "0.0"),
        ("T1", "D2", "1.0"),
        ("T1", "D2", "2.0"),
        ("T2", "D1", "0.0"),
        ("T2", "D1", "3.0"),
        ("T2", "D1", "5.0"),
        ("T2", "D2", "2.0"),
        ("T2", "D2", "4.0"),
        ("T2", "D2", "6.0"),
        ("T2", "D3", "0.2"),
        ("T2", "D3", "0.4"),
        ("T2", "D3", "0.6"),
    ];
    let lines: Vec<String> = evidence
        .iter()
        .map(|(t, d, s)| {
            format!(r#"{{"targetId":"{t}","diseaseId":"{d}","score":{s},"datasourceId":"eva"}}"#)
        })
        .collect();
    // Split across two files to exercise the multi-file read.
    fs::write(dataset.evidence.join("part-0.json"), lines[..7].join("\n")).expect("evidence");
    fs::write(dataset.evidence.join("part-1.json"), lines[7..].join("\n")).expect("evidence");
    fs::write(dataset.evidence.join("_SUCCESS"), "").expect("marker");

    fs::write(
        dataset.targets.join("targets.json"),
        "{\"id\":\"T1\",\"approvedSymbol\":\"AAA\",\"biotype\":\"protein_coding\"}\n\
         {\"id\":\"T2\",\"approvedSymbol\":\"BBB\"}\n",
    )
    .expect("targets");
    fs::write(
        dataset.diseases.join("diseases.json"),
        "{\"id\":\"D1\",\"name\":\"Disease One\"}\n\
         {\"id\":\"D2\",\"name\":\"Disease Two\"}\n\
         {\"id\":\"D3\",\"name\":\"Disease Three\"}\n",
    )
    .expect("diseases");

    dataset
}

pub fn read_lines(path: &Path) -> Vec<serde_json::Value> {
    fs::read_to_string(path)
        .expect("read output")
        .lines()
        .map(|line| serde_json::from_str(line).expect("valid JSON line"))
        .collect()
}
