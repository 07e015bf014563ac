//! アップロード・編集ワークフロー
//!
//! 状態遷移: NoImage -> ImageLoaded -> Analyzing -> ResultsEditable -> Saved
//!
//! - 解析応答はパースの成否にかかわらず先に記録ストアへ保存する
//! - パース失敗時は既存の編集行をそのまま残す
//! - 保存は全行を検証してから書き込む（数値でないカロリー値が1つでもあれば何も保存しない）

mod rows;

pub use rows::{EditableRow, EditableRows, RowId};

use std::path::{Path, PathBuf};

use calorie_ai_common::{parse_food_reply, FOOD_ANALYSIS_PROMPT};
use chrono::{Local, NaiveDate};
use image::RgbaImage;
use tracing::{debug, error, info, warn};

use crate::describer::ImageDescriber;
use crate::error::{CalorieAiError, Result};
use crate::store::{CalorieEntry, RecordStore};

const PREVIEW_WIDTH: u32 = 480;
const PREVIEW_HEIGHT: u32 = 360;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    NoImage,
    ImageLoaded,
    Analyzing,
    ResultsEditable,
    Saved,
}

/// 読み込み済みの画像
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub path: PathBuf,
    /// 監査用に保存する元のバイト列
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// 表示用の縮小画像
    pub preview: RgbaImage,
}

impl LoadedImage {
    pub fn read(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .map_err(|e| CalorieAiError::ImageLoad(format!("{}: {}", path.display(), e)))?;
        let decoded = image::load_from_memory(&bytes)
            .map_err(|e| CalorieAiError::ImageLoad(format!("{}: {}", path.display(), e)))?;

        Ok(Self {
            path: path.to_path_buf(),
            width: decoded.width(),
            height: decoded.height(),
            preview: decoded.thumbnail(PREVIEW_WIDTH, PREVIEW_HEIGHT).to_rgba8(),
            bytes,
        })
    }
}

/// 解析の結果（いずれの場合も要求は記録済み）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalyzeOutcome {
    /// 編集行を置き換えた件数（0件もあり得る）
    Rows(usize),
    /// サービスが何も返さなかった
    EmptyReply,
    /// 応答をパースできなかった
    Malformed(String),
}

impl AnalyzeOutcome {
    /// 利用者に見せる警告文
    pub fn warning(&self) -> Option<String> {
        match self {
            AnalyzeOutcome::Rows(_) => None,
            AnalyzeOutcome::EmptyReply => Some("The service returned no analysis result.".into()),
            AnalyzeOutcome::Malformed(reason) => {
                Some(format!("Could not parse the analysis result: {reason}"))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveSummary {
    pub saved: usize,
    pub skipped: usize,
    /// 保存後の一覧再読込に成功したか
    pub entries_reloaded: bool,
}

pub struct UploadWorkflow<D> {
    store: RecordStore,
    describer: D,
    state: WorkflowState,
    image: Option<LoadedImage>,
    rows: EditableRows,
    date: NaiveDate,
    entries: Vec<CalorieEntry>,
}

impl<D: ImageDescriber> UploadWorkflow<D> {
    pub fn new(store: RecordStore, describer: D) -> Self {
        Self {
            store,
            describer,
            state: WorkflowState::NoImage,
            image: None,
            rows: EditableRows::default(),
            date: Local::now().date_naive(),
            entries: Vec::new(),
        }
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn image(&self) -> Option<&LoadedImage> {
        self.image.as_ref()
    }

    /// 画像を読み込む。失敗時は状態も以前の画像も変えない
    pub fn load_image(&mut self, path: &Path) -> Result<&LoadedImage> {
        let loaded = LoadedImage::read(path).inspect_err(|err| {
            warn!(path = %path.display(), error = %err, "image load failed");
        })?;

        info!(
            path = %path.display(),
            width = loaded.width,
            height = loaded.height,
            "image loaded"
        );
        self.state = WorkflowState::ImageLoaded;
        Ok(&*self.image.insert(loaded))
    }

    /// 記述サービスで解析し、結果を編集行へ展開する
    pub fn analyze(&mut self) -> Result<AnalyzeOutcome> {
        let Some(image) = &self.image else {
            warn!("analysis requested without an image");
            return Err(CalorieAiError::NoImage);
        };

        let previous = self.state;
        self.state = WorkflowState::Analyzing;
        info!(path = %image.path.display(), "analysis started");

        let reply = match self.describer.describe(&image.path, FOOD_ANALYSIS_PROMPT) {
            Ok(reply) => reply,
            Err(err) => {
                error!(error = %err, "description service call failed");
                self.state = previous;
                return Err(err);
            }
        };

        // パース前に生の応答を記録する
        if let Err(err) =
            self.store
                .create_analysis_request(&image.bytes, FOOD_ANALYSIS_PROMPT, reply.as_deref())
        {
            self.state = previous;
            return Err(err);
        }
        self.state = WorkflowState::ResultsEditable;

        let Some(reply) = reply else {
            warn!("description service returned nothing");
            return Ok(AnalyzeOutcome::EmptyReply);
        };

        match parse_food_reply(&reply) {
            Ok(parsed) => {
                self.rows.clear();
                for item in parsed.output {
                    debug!(food_name = %item.food_name, calories = %item.calories, "food detected");
                    self.rows.push(item.food_name, item.calories);
                }
                info!(rows = self.rows.len(), "analysis result applied");
                Ok(AnalyzeOutcome::Rows(self.rows.len()))
            }
            Err(err) => {
                warn!(error = %err, "analysis reply could not be parsed");
                Ok(AnalyzeOutcome::Malformed(err.to_string()))
            }
        }
    }

    pub fn rows(&self) -> &[EditableRow] {
        self.rows.as_slice()
    }

    pub fn rows_mut(&mut self) -> &mut [EditableRow] {
        self.rows.as_mut_slice()
    }

    /// 編集行を追加（手入力も可）
    pub fn add_row(&mut self, food_name: impl Into<String>, calories: impl Into<String>) -> RowId {
        let id = self.rows.push(food_name, calories);
        if self.state != WorkflowState::ResultsEditable {
            self.state = WorkflowState::ResultsEditable;
        }
        debug!(?id, "editable row added");
        id
    }

    /// 編集行を削除（状態は変えない）
    pub fn remove_row(&mut self, id: RowId) -> bool {
        let removed = self.rows.remove(id);
        debug!(?id, removed, "editable row removed");
        removed
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn set_date(&mut self, date: NaiveDate) {
        self.date = date;
    }

    /// 編集行をまとめて保存する
    ///
    /// 食品名かカロリーが空の行は黙って飛ばす。
    /// 数値でないカロリー値があれば何も書き込まずにエラーを返す。
    pub fn save(&mut self) -> Result<SaveSummary> {
        let mut pending = Vec::new();
        let mut skipped = 0;

        for row in self.rows.as_slice() {
            let food_name = row.food_name.trim();
            let calories = row.calories.trim();
            if food_name.is_empty() || calories.is_empty() {
                debug!(id = ?row.id, "blank row skipped");
                skipped += 1;
                continue;
            }
            let value = calories.parse::<i64>().map_err(|_| {
                warn!(food_name, calories, "non-numeric calories; save rejected");
                CalorieAiError::InvalidCalories {
                    food_name: food_name.to_string(),
                    value: calories.to_string(),
                }
            })?;
            pending.push((food_name.to_string(), value));
        }

        // 全行を1トランザクションで書く（途中失敗なら1行も残らない）
        self.store.create_calorie_entries(&pending, self.date)?;

        self.rows.clear();
        self.state = WorkflowState::Saved;
        info!(saved = pending.len(), skipped, date = %self.date, "calorie rows saved");

        let entries_reloaded = match self.reload_entries() {
            Ok(_) => true,
            Err(err) => {
                warn!(error = %err, "saved, but reloading entries failed");
                false
            }
        };

        Ok(SaveSummary {
            saved: pending.len(),
            skipped,
            entries_reloaded,
        })
    }

    /// 最後に読み込めた保存済み一覧
    pub fn entries(&self) -> &[CalorieEntry] {
        &self.entries
    }

    /// 保存済み一覧を再読込（失敗時は以前の一覧を保持）
    pub fn reload_entries(&mut self) -> Result<usize> {
        self.entries = self.store.list_calorie_entries()?;
        Ok(self.entries.len())
    }

    /// 保存済みの記録を削除して一覧を再読込
    pub fn delete_entry(&mut self, id: i64) -> Result<bool> {
        let removed = self.store.delete_calorie_entry(id)?;
        self.reload_entries()?;
        Ok(removed)
    }
}
