//! End-to-end pipeline tests: merge item files, evaluate against a scripted
//! oracle, write results, read them back and aggregate.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pragmatics_eval::prelude::*;

const HEADER: &str = "Context,Option_A,Option_B,Gold_Label,Phenomenon,Domain,Role_Direction,Item_ID";

/// Answers by looking up the context line of the prompt
struct KeyedOracle {
    answers: HashMap<String, ProviderResult<String>>,
    calls: Mutex<Vec<String>>,
}

impl KeyedOracle {
    fn new(answers: Vec<(&str, ProviderResult<String>)>) -> Arc<Self> {
        Arc::new(Self {
            answers: answers.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
            calls: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl LLMProvider for KeyedOracle {
    fn name(&self) -> &str {
        "keyed"
    }

    fn default_model(&self) -> &str {
        "keyed-model"
    }

    async fn complete(&self, request: &CompletionRequest) -> ProviderResult<CompletionResponse> {
        let prompt = &request.messages[0].content;
        let context = prompt
            .lines()
            .next()
            .and_then(|l| l.strip_prefix("Context: "))
            .unwrap_or_default()
            .to_string();
        self.calls.lock().unwrap().push(context.clone());

        match self.answers.get(&context) {
            Some(Ok(text)) => Ok(CompletionResponse::text(text.clone())),
            Some(Err(_)) | None => Err(ProviderError::Api {
                status: 500,
                message: format!("no answer for {context}"),
            }),
        }
    }
}

fn write_file(dir: &Path, name: &str, rows: &[&str]) -> std::path::PathBuf {
    let path = dir.join(name);
    let mut content = String::from(HEADER);
    content.push('\n');
    for row in rows {
        content.push_str(row);
        content.push('\n');
    }
    std::fs::write(&path, content).unwrap();
    path
}

#[tokio::test]
async fn test_merge_evaluate_write_and_report() {
    let dir = tempfile::tempdir().unwrap();
    let politeness = write_file(
        dir.path(),
        "items_politeness.csv",
        &[
            "p1,\"Vă rog, luați loc.\",Stai jos.,A,politeness,office,junior-senior,POL-1",
            "p2,Dă-mi sarea.,\"Îmi dați sarea, vă rog?\",B,politeness,family,junior-senior,POL-2",
        ],
    );
    let indirectness = write_file(dir.path(), "items_indirectness.csv", &[]);
    let implicature = write_file(
        dir.path(),
        "items_implicature.csv",
        &[
            "i1,Nu prea.,Da.,A,implicature,office,peer,IMP-1",
            "i2,Sigur.,Mai vedem.,B,implicature,school,peer,IMP-2",
            "i3,Poate.,Desigur.,A,implicature,family,senior-junior,IMP-3",
        ],
    );

    let merged_path = dir.path().join("items_all.csv");
    let merged = merge_files(&[&politeness, &indirectness, &implicature], &merged_path).unwrap();
    assert_eq!(merged.len(), 5);

    let items = ItemTable::load(&merged_path).unwrap();
    let contexts: Vec<_> = items.rows().iter().map(|r| r.item.context.as_str()).collect();
    assert_eq!(contexts, vec!["p1", "p2", "i1", "i2", "i3"]);

    let oracle = KeyedOracle::new(vec![
        ("p1", Ok(" a ".to_string())),
        ("p2", Ok("B".to_string())),
        ("i1", Ok("b".to_string())),
        ("i2", Err(ProviderError::Parse("unused".to_string()))),
        ("i3", Ok("Option A".to_string())),
    ]);
    let executor = Executor::new(oracle.clone(), ExecutorConfig::default());
    let results = executor.evaluate(&items, &NoOpProgress).await.unwrap();

    assert_eq!(*oracle.calls.lock().unwrap(), vec!["p1", "p2", "i1", "i2", "i3"]);
    let predictions: Vec<_> = results.iter().map(|r| r.prediction_text()).collect();
    assert_eq!(predictions, vec!["A", "B", "B", "", "UNKNOWN"]);

    let results_path = dir.path().join("results_keyed_model.csv");
    write_results(&results_path, items.headers(), &results).unwrap();

    let written = Table::read(&results_path).unwrap();
    assert_eq!(
        written.headers.last().map(String::as_str),
        Some("Correct")
    );
    assert_eq!(written.rows[0][7], "POL-1");
    let correct: Vec<_> = written.rows.iter().map(|r| r[9].as_str()).collect();
    assert_eq!(correct, vec!["True", "True", "False", "False", "False"]);

    let reread = read_results(&results_path).unwrap();
    assert_eq!(reread, results);

    let summary = EvaluationSummary::from_results(&reread);
    assert_eq!(summary.overall, Metric::new(2, 5));
    assert_eq!(summary.accuracy(), 40.0);
    let phenomena: Vec<_> = summary.by_phenomenon.keys().collect();
    assert_eq!(phenomena, vec!["politeness", "implicature"]);
    assert_eq!(summary.by_phenomenon.metric("politeness").percentage(), 100.0);
    assert_eq!(summary.by_domain.metric("office"), Metric::new(1, 2));
    // A-gold: p1 right, i1 wrong, i3 wrong -> 1/3; B-gold: p2 right, i2 failed -> 1/2
    let expected = (1.0 / 3.0 + 0.5) / 2.0 * 100.0;
    assert!((summary.macro_recall() - expected).abs() < 1e-9);
}

#[test]
fn test_merge_rejects_mismatched_schema() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_file(dir.path(), "a.csv", &["c,x,y,A,p,d,r,1"]);
    let b = dir.path().join("b.csv");
    std::fs::write(&b, "Context,Option_A,Option_B,Gold_Label\nc,x,y,B\n").unwrap();
    let out = dir.path().join("all.csv");

    let err = merge_files(&[a, b], &out).unwrap_err();
    assert!(matches!(err, EvalError::SchemaMismatch { .. }));
    assert!(!out.exists());
}
