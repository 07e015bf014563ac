//! 日別カロリー推移グラフのデータとスケール計算
//!
//! 描画はデスクトップ側で行い、ここでは座標の割合とラベルだけを扱う。

use chrono::NaiveDate;
use tracing::{error, info};

use crate::store::{DailyTotal, RecordStore, DATE_FORMAT};

pub const CHART_TITLE: &str = "Calorie Intake";
pub const X_AXIS_LABEL: &str = "Date";
pub const Y_AXIS_LABEL: &str = "Calorie Total";
pub const NO_DATA_LABEL: &str = "No data";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalorieChart {
    points: Vec<DailyTotal>,
}

impl CalorieChart {
    /// ストアから日別合計を読み込む。読み込み失敗は空のグラフとして扱う
    pub fn load(store: &RecordStore) -> Self {
        match store.sum_calories_by_date() {
            Ok(points) => {
                info!(days = points.len(), "chart data loaded");
                Self::from_points(points)
            }
            Err(err) => {
                error!(error = %err, "chart data could not be read; showing placeholder");
                Self::default()
            }
        }
    }

    pub fn from_points(mut points: Vec<DailyTotal>) -> Self {
        points.sort_by_key(|p| p.date);
        Self { points }
    }

    pub fn points(&self) -> &[DailyTotal] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// 最初の日を0、最後の日を1とした横位置（1日だけなら中央）
    pub fn x_fraction(&self, date: NaiveDate) -> f32 {
        let (Some(first), Some(last)) = (self.points.first(), self.points.last()) else {
            return 0.5;
        };
        let span = (last.date - first.date).num_days();
        if span == 0 {
            return 0.5;
        }
        (date - first.date).num_days() as f32 / span as f32
    }

    /// 縦軸の範囲（0から切りのよい最大値まで）
    pub fn y_range(&self) -> (i64, i64) {
        let min = self.points.iter().map(|p| p.total).min().unwrap_or(0).min(0);
        let max = self.points.iter().map(|p| p.total).max().unwrap_or(0);
        (min, nice_ceiling(max))
    }

    /// 値を縦軸の割合（下端0、上端1）に変換
    pub fn y_fraction(&self, value: i64) -> f32 {
        let (min, max) = self.y_range();
        if max == min {
            return 0.0;
        }
        ((value as f64 - min as f64) / (max as f64 - min as f64)) as f32
    }

    /// 縦軸の目盛り値（両端を含めて `count + 1` 個）
    pub fn y_ticks(&self, count: usize) -> Vec<i64> {
        let (min, max) = self.y_range();
        // 幅の広い範囲でも溢れないよう i128 で計算
        let (min, max) = (i128::from(min), i128::from(max));
        let count = count.max(1) as i128;
        (0..=count)
            .map(|i| (min + (max - min) * i / count) as i64)
            .collect()
    }

    /// 横軸の日付ラベル
    pub fn date_labels(&self) -> Vec<(f32, String)> {
        self.points
            .iter()
            .map(|p| (self.x_fraction(p.date), p.date.format(DATE_FORMAT).to_string()))
            .collect()
    }
}

/// 1, 2, 5 × 10^n のうち value 以上で最小のもの（i64 に収まらなければ i64::MAX）
fn nice_ceiling(value: i64) -> i64 {
    if value <= 0 {
        return 100;
    }
    let mut magnitude = 1i64;
    while let Some(next) = magnitude.checked_mul(10) {
        if next > value {
            break;
        }
        magnitude = next;
    }
    for step in [1i64, 2, 5, 10] {
        match step.checked_mul(magnitude) {
            Some(ceiling) if ceiling >= value => return ceiling,
            Some(_) => {}
            None => break,
        }
    }
    i64::MAX
}
