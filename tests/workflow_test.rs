//! アップロード・編集ワークフローの統合テスト
//!
//! 記述サービスは固定応答を返すスタブに差し替える

use std::cell::Cell;
use std::path::{Path, PathBuf};

use calorie_ai_common::FOOD_ANALYSIS_PROMPT;
use calorie_ai_rust::chart::CalorieChart;
use calorie_ai_rust::describer::ImageDescriber;
use calorie_ai_rust::error::{CalorieAiError, Result};
use calorie_ai_rust::history::{HistoryColumn, HistoryView};
use calorie_ai_rust::store::RecordStore;
use calorie_ai_rust::workflow::{AnalyzeOutcome, UploadWorkflow, WorkflowState};
use chrono::NaiveDate;
use tempfile::{tempdir, TempDir};

/// 固定の応答を返す記述サービス
struct CannedDescriber {
    reply: Option<String>,
    fail: bool,
    calls: Cell<usize>,
}

impl CannedDescriber {
    fn replying(reply: &str) -> Self {
        Self { reply: Some(reply.to_string()), fail: false, calls: Cell::new(0) }
    }

    fn silent() -> Self {
        Self { reply: None, fail: false, calls: Cell::new(0) }
    }

    fn failing() -> Self {
        Self { reply: None, fail: true, calls: Cell::new(0) }
    }
}

impl ImageDescriber for CannedDescriber {
    fn describe(&self, image_path: &Path, instruction: &str) -> Result<Option<String>> {
        assert!(image_path.exists());
        assert_eq!(instruction, FOOD_ANALYSIS_PROMPT);
        self.calls.set(self.calls.get() + 1);
        if self.fail {
            return Err(CalorieAiError::ApiCall("connection refused".into()));
        }
        Ok(self.reply.clone())
    }
}

struct Fixture {
    dir: TempDir,
    store: RecordStore,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempdir().expect("Failed to create temp dir");
        let store = RecordStore::open(dir.path().join("app.db")).expect("store open");
        Self { dir, store }
    }

    fn image(&self, name: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        image::RgbImage::from_pixel(8, 6, image::Rgb([200, 120, 40]))
            .save(&path)
            .expect("write fixture image");
        path
    }

    fn workflow(&self, describer: CannedDescriber) -> UploadWorkflow<CannedDescriber> {
        UploadWorkflow::new(self.store.clone(), describer)
    }
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

const TWO_FOODS: &str = r#"```json
{
    "output": [
        {"food_name": "Chicken", "calories": "100"},
        {"food_name": "Pizza", "calories": 200}
    ]
}
```"#;

#[test]
fn test_initial_state() {
    let fx = Fixture::new();
    let wf = fx.workflow(CannedDescriber::silent());
    assert_eq!(wf.state(), WorkflowState::NoImage);
    assert!(wf.image().is_none());
    assert!(wf.rows().is_empty());
}

#[test]
fn test_load_image() {
    let fx = Fixture::new();
    let path = fx.image("meal.png");
    let mut wf = fx.workflow(CannedDescriber::silent());

    let loaded = wf.load_image(&path).unwrap();
    assert_eq!((loaded.width, loaded.height), (8, 6));
    assert!(!loaded.bytes.is_empty());
    assert_eq!(wf.state(), WorkflowState::ImageLoaded);
}

/// 画像でないファイルは状態を変えない
#[test]
fn test_invalid_image_keeps_state() {
    let fx = Fixture::new();
    let bogus = fx.dir.path().join("notes.png");
    std::fs::write(&bogus, b"this is not an image").unwrap();
    let mut wf = fx.workflow(CannedDescriber::silent());

    let result = wf.load_image(&bogus);
    assert!(matches!(result, Err(CalorieAiError::ImageLoad(_))));
    assert_eq!(wf.state(), WorkflowState::NoImage);

    let good = fx.image("meal.png");
    wf.load_image(&good).unwrap();
    assert!(wf.load_image(&fx.dir.path().join("missing.jpg")).is_err());
    assert_eq!(wf.state(), WorkflowState::ImageLoaded);
    assert_eq!(wf.image().unwrap().path, good);
}

#[test]
fn test_analyze_without_image() {
    let fx = Fixture::new();
    let describer = CannedDescriber::replying(TWO_FOODS);
    let mut wf = fx.workflow(describer);

    assert!(matches!(wf.analyze(), Err(CalorieAiError::NoImage)));
    assert_eq!(wf.state(), WorkflowState::NoImage);
    assert!(fx.store.list_analysis_requests().unwrap().is_empty());
}

/// 解析結果が編集行になり、生の応答が記録される
#[test]
fn test_analyze_populates_rows_and_audits_raw_reply() {
    let fx = Fixture::new();
    let path = fx.image("meal.png");
    let mut wf = fx.workflow(CannedDescriber::replying(TWO_FOODS));
    wf.load_image(&path).unwrap();

    assert_eq!(wf.analyze().unwrap(), AnalyzeOutcome::Rows(2));
    assert_eq!(wf.state(), WorkflowState::ResultsEditable);

    let rows = wf.rows();
    assert_eq!(rows[0].food_name, "Chicken");
    assert_eq!(rows[0].calories, "100");
    assert_eq!(rows[1].food_name, "Pizza");
    assert_eq!(rows[1].calories, "200");

    let requests = fx.store.list_analysis_requests().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].prompt, FOOD_ANALYSIS_PROMPT);
    assert_eq!(requests[0].response.as_deref(), Some(TWO_FOODS));
}

/// 新しい解析結果は未保存の行を置き換える
#[test]
fn test_analyze_replaces_unsaved_rows() {
    let fx = Fixture::new();
    let path = fx.image("meal.png");
    let mut wf = fx.workflow(CannedDescriber::replying(TWO_FOODS));
    wf.load_image(&path).unwrap();
    wf.add_row("Leftover", "10");

    wf.analyze().unwrap();
    let names: Vec<_> = wf.rows().iter().map(|r| r.food_name.as_str()).collect();
    assert_eq!(names, ["Chicken", "Pizza"]);
}

/// 空配列は0行で警告なし
#[test]
fn test_analyze_empty_output() {
    let fx = Fixture::new();
    let path = fx.image("landscape.png");
    let mut wf = fx.workflow(CannedDescriber::replying(r#"{"output": []}"#));
    wf.load_image(&path).unwrap();

    let outcome = wf.analyze().unwrap();
    assert_eq!(outcome, AnalyzeOutcome::Rows(0));
    assert_eq!(outcome.warning(), None);
    assert!(wf.rows().is_empty());
    assert_eq!(fx.store.list_analysis_requests().unwrap().len(), 1);
}

/// JSONでない応答も1件記録され、行は増えず警告になる
#[test]
fn test_analyze_malformed_reply_still_audited() {
    let fx = Fixture::new();
    let path = fx.image("meal.png");
    let reply = "Sorry, I can't tell what this is.";
    let mut wf = fx.workflow(CannedDescriber::replying(reply));
    wf.load_image(&path).unwrap();

    let outcome = wf.analyze().unwrap();
    assert!(matches!(outcome, AnalyzeOutcome::Malformed(_)));
    assert!(outcome.warning().is_some());
    assert!(wf.rows().is_empty());
    assert_eq!(wf.state(), WorkflowState::ResultsEditable);

    let requests = fx.store.list_analysis_requests().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].response.as_deref(), Some(reply));
}

/// パース失敗時は既存の行を残す
#[test]
fn test_analyze_missing_output_key_keeps_rows() {
    let fx = Fixture::new();
    let path = fx.image("meal.png");
    let mut wf = fx.workflow(CannedDescriber::replying(r#"{"foods": []}"#));
    wf.load_image(&path).unwrap();
    wf.add_row("Rice", "300");

    let outcome = wf.analyze().unwrap();
    assert!(matches!(outcome, AnalyzeOutcome::Malformed(_)));
    assert_eq!(wf.rows().len(), 1);
    assert_eq!(wf.rows()[0].food_name, "Rice");
}

/// 応答なしはNULLとして記録される
#[test]
fn test_analyze_no_reply_recorded_as_null() {
    let fx = Fixture::new();
    let path = fx.image("meal.png");
    let mut wf = fx.workflow(CannedDescriber::silent());
    wf.load_image(&path).unwrap();

    let outcome = wf.analyze().unwrap();
    assert_eq!(outcome, AnalyzeOutcome::EmptyReply);
    assert!(outcome.warning().is_some());

    let requests = fx.store.list_analysis_requests().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].response, None);
}

/// 通信失敗は記録せず、状態を戻す
#[test]
fn test_analyze_transport_failure() {
    let fx = Fixture::new();
    let path = fx.image("meal.png");
    let mut wf = fx.workflow(CannedDescriber::failing());
    wf.load_image(&path).unwrap();

    assert!(matches!(wf.analyze(), Err(CalorieAiError::ApiCall(_))));
    assert_eq!(wf.state(), WorkflowState::ImageLoaded);
    assert!(fx.store.list_analysis_requests().unwrap().is_empty());
}

/// 行の削除はIDで行い、状態は変わらない
#[test]
fn test_remove_row_by_id() {
    let fx = Fixture::new();
    let mut wf = fx.workflow(CannedDescriber::silent());

    let a = wf.add_row("A", "1");
    let b = wf.add_row("B", "2");
    assert_eq!(wf.state(), WorkflowState::ResultsEditable);

    assert!(wf.remove_row(a));
    assert!(!wf.remove_row(a));
    assert_eq!(wf.rows().len(), 1);
    assert_eq!(wf.rows()[0].id, b);
    assert_eq!(wf.state(), WorkflowState::ResultsEditable);
}

/// 保存シナリオ: 日付ごとの合計
#[test]
fn test_save_batches_and_daily_totals() {
    let fx = Fixture::new();
    let mut wf = fx.workflow(CannedDescriber::silent());

    wf.set_date(date("2024-01-01"));
    wf.add_row("Chicken", "100");
    wf.add_row("Pizza", "200");
    let summary = wf.save().unwrap();
    assert_eq!(summary.saved, 2);
    assert_eq!(summary.skipped, 0);
    assert!(summary.entries_reloaded);
    assert_eq!(wf.state(), WorkflowState::Saved);
    assert!(wf.rows().is_empty());
    assert_eq!(wf.entries().len(), 2);

    wf.set_date(date("2024-01-02"));
    wf.add_row("Salad", "50");
    wf.save().unwrap();

    let totals: Vec<(NaiveDate, i64)> = fx
        .store
        .sum_calories_by_date()
        .unwrap()
        .into_iter()
        .map(|t| (t.date, t.total))
        .collect();
    assert_eq!(totals, vec![(date("2024-01-01"), 300), (date("2024-01-02"), 50)]);
}

/// 空欄の行は黙って飛ばす
#[test]
fn test_save_skips_blank_rows() {
    let fx = Fixture::new();
    let mut wf = fx.workflow(CannedDescriber::silent());
    wf.set_date(date("2024-03-01"));

    wf.add_row("  Kimchi  ", " 20 ");
    wf.add_row("", "150");
    wf.add_row("Water", "   ");

    let summary = wf.save().unwrap();
    assert_eq!(summary.saved, 1);
    assert_eq!(summary.skipped, 2);

    let entries = fx.store.list_calorie_entries().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].food_name, "Kimchi");
    assert_eq!(entries[0].calories, 20);
    assert_eq!(entries[0].date, date("2024-03-01"));
}

/// 数値でないカロリー値があれば何も保存しない
#[test]
fn test_save_rejects_non_numeric_calories() {
    let fx = Fixture::new();
    let mut wf = fx.workflow(CannedDescriber::silent());

    wf.add_row("Rice", "300");
    wf.add_row("Cake", "about 400");

    let err = wf.save().unwrap_err();
    match err {
        CalorieAiError::InvalidCalories { food_name, value } => {
            assert_eq!(food_name, "Cake");
            assert_eq!(value, "about 400");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    assert!(fx.store.list_calorie_entries().unwrap().is_empty());
    assert_eq!(wf.rows().len(), 2);
    assert_eq!(wf.state(), WorkflowState::ResultsEditable);
}

/// 小数のカロリー値も数値でないものとして扱う
#[test]
fn test_save_rejects_fractional_calories() {
    let fx = Fixture::new();
    let mut wf = fx.workflow(CannedDescriber::silent());
    wf.add_row("Salad", "52.5");
    assert!(matches!(wf.save(), Err(CalorieAiError::InvalidCalories { .. })));
}

/// 行を編集してから保存
#[test]
fn test_save_uses_edited_values() {
    let fx = Fixture::new();
    let path = fx.image("meal.png");
    let mut wf = fx.workflow(CannedDescriber::replying(TWO_FOODS));
    wf.load_image(&path).unwrap();
    wf.analyze().unwrap();

    wf.rows_mut()[0].calories = "150".to_string();
    let pizza = wf.rows()[1].id;
    wf.remove_row(pizza);
    wf.save().unwrap();

    let entries = fx.store.list_calorie_entries().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].food_name, "Chicken");
    assert_eq!(entries[0].calories, 150);
}

/// 保存済み記録の削除と再読込
#[test]
fn test_delete_entry_reloads_list() {
    let fx = Fixture::new();
    let mut wf = fx.workflow(CannedDescriber::silent());
    wf.add_row("Bread", "250");
    wf.add_row("Milk", "120");
    wf.save().unwrap();

    let milk = wf.entries().iter().find(|e| e.food_name == "Milk").unwrap().id;
    assert!(wf.delete_entry(milk).unwrap());
    assert_eq!(wf.entries().len(), 1);
    assert_eq!(wf.entries()[0].food_name, "Bread");

    assert!(!wf.delete_entry(milk).unwrap());
    assert_eq!(wf.entries().len(), 1);
}

/// 再読込に失敗しても前回の一覧を保持
#[test]
fn test_reload_failure_keeps_previous_entries() {
    let dir = tempdir().expect("Failed to create temp dir");
    let db_dir = dir.path().join("data");
    std::fs::create_dir_all(&db_dir).unwrap();
    let store = RecordStore::open(db_dir.join("app.db")).unwrap();

    let mut wf = UploadWorkflow::new(store, CannedDescriber::silent());
    wf.add_row("Bread", "250");
    wf.save().unwrap();
    assert_eq!(wf.entries().len(), 1);

    std::fs::remove_dir_all(&db_dir).unwrap();
    assert!(wf.reload_entries().is_err());
    assert!(wf.delete_entry(wf.entries()[0].id).is_err());
    assert_eq!(wf.entries().len(), 1);
}

/// 新しい画像を読み込むと保存済み状態から戻る
#[test]
fn test_new_image_after_save() {
    let fx = Fixture::new();
    let path = fx.image("meal.png");
    let mut wf = fx.workflow(CannedDescriber::silent());
    wf.add_row("Bread", "250");
    wf.save().unwrap();
    assert_eq!(wf.state(), WorkflowState::Saved);

    wf.load_image(&path).unwrap();
    assert_eq!(wf.state(), WorkflowState::ImageLoaded);
}

/// 履歴は解析ごとに増え、読込失敗時は以前の内容を保持
#[test]
fn test_history_refresh_keeps_rows_on_failure() {
    let dir = tempdir().expect("Failed to create temp dir");
    let db_dir = dir.path().join("data");
    std::fs::create_dir_all(&db_dir).unwrap();
    let store = RecordStore::open(db_dir.join("app.db")).unwrap();

    let path = dir.path().join("meal.png");
    image::RgbImage::from_pixel(4, 4, image::Rgb([10, 20, 30])).save(&path).unwrap();
    let mut wf = UploadWorkflow::new(store.clone(), CannedDescriber::replying(TWO_FOODS));
    wf.load_image(&path).unwrap();
    wf.analyze().unwrap();

    let mut history = HistoryView::default();
    assert_eq!(history.refresh(&store).unwrap(), 1);
    let full = history.select_cell(0, HistoryColumn::Response).unwrap();
    assert_eq!(full, TWO_FOODS);
    assert_eq!(history.detail_text(), TWO_FOODS);

    std::fs::remove_dir_all(&db_dir).unwrap();
    assert!(history.refresh(&store).is_err());
    assert_eq!(history.len(), 1);
    assert_eq!(history.cell_text(0, HistoryColumn::Prompt).as_deref(), Some(FOOD_ANALYSIS_PROMPT));
}

/// グラフは保存済みの日別合計を反映し、読めないストアでは空になる
#[test]
fn test_chart_reflects_store_and_handles_failure() {
    let dir = tempdir().expect("Failed to create temp dir");
    let db_dir = dir.path().join("data");
    std::fs::create_dir_all(&db_dir).unwrap();
    let store = RecordStore::open(db_dir.join("app.db")).unwrap();

    let mut wf = UploadWorkflow::new(store.clone(), CannedDescriber::silent());
    wf.set_date(date("2024-01-01"));
    wf.add_row("Chicken", "100");
    wf.add_row("Pizza", "200");
    wf.save().unwrap();

    let chart = CalorieChart::load(&store);
    assert_eq!(chart.points().len(), 1);
    assert_eq!(chart.points()[0].total, 300);

    std::fs::remove_dir_all(&db_dir).unwrap();
    assert!(CalorieChart::load(&store).is_empty());
}

/// 保存の途中失敗後に再保存しても行が重複しない
#[test]
fn test_save_retry_after_partial_failure_does_not_duplicate() {
    let fx = Fixture::new();
    let conn = rusqlite::Connection::open(fx.store.path()).unwrap();
    conn.execute_batch(
        "CREATE TRIGGER reject_pizza BEFORE INSERT ON calories
         WHEN NEW.food_name = 'Pizza'
         BEGIN SELECT RAISE(ABORT, 'disk full'); END;",
    )
    .unwrap();

    let mut wf = fx.workflow(CannedDescriber::silent());
    wf.add_row("Chicken", "100");
    wf.add_row("Pizza", "200");

    assert!(matches!(wf.save(), Err(CalorieAiError::Storage(_))));
    assert_eq!(wf.rows().len(), 2);
    assert_eq!(wf.state(), WorkflowState::ResultsEditable);
    assert!(fx.store.list_calorie_entries().unwrap().is_empty());

    conn.execute_batch("DROP TRIGGER reject_pizza;").unwrap();
    assert_eq!(wf.save().unwrap().saved, 2);

    let names: Vec<String> = fx
        .store
        .list_calorie_entries()
        .unwrap()
        .into_iter()
        .map(|e| e.food_name)
        .collect();
    assert_eq!(names, ["Pizza", "Chicken"]);
}

/// 極端に大きいカロリー値を保存してもグラフ計算は落ちない
#[test]
fn test_chart_handles_huge_saved_total() {
    let fx = Fixture::new();
    let mut wf = fx.workflow(CannedDescriber::silent());
    wf.set_date(date("2024-01-01"));
    wf.add_row("Huge", "2000000000000000000");
    wf.save().unwrap();
    wf.set_date(date("2024-01-02"));
    wf.add_row("Huger", "9000000000000000000");
    wf.save().unwrap();

    let chart = CalorieChart::load(&fx.store);
    assert_eq!(chart.points().len(), 2);
    assert_eq!(chart.y_range(), (0, i64::MAX));
    assert_eq!(chart.y_ticks(5).len(), 6);
    let top = chart.y_fraction(9_000_000_000_000_000_000);
    assert!(top > 0.9 && top <= 1.0);
}
