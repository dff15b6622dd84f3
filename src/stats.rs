//! Aggregates over tasks and time records.

use rusqlite::params;

use crate::error::StoreError;
use crate::models::{CategoryTotal, DailyTotal};
use crate::storage::Store;

impl Store {
    /// Total minutes per calendar day (UTC), newest day first.
    pub fn get_daily_stats(&self) -> Result<Vec<DailyTotal>, StoreError> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT DATE(recorded_at) AS day, SUM(duration_minutes)
             FROM time_records
             GROUP BY day
             ORDER BY day DESC",
        )?;
        let totals = stmt
            .query_map([], |row| {
                Ok(DailyTotal {
                    date: row.get(0)?,
                    minutes: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(totals)
    }

    /// Percentage of tasks marked completed, `0.0` when there are no tasks.
    pub fn get_completion_rate(&self) -> Result<f64, StoreError> {
        let conn = self.connect()?;
        let (total, completed): (i64, i64) = conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(completed != 0), 0) FROM tasks",
            params![],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        if total == 0 {
            return Ok(0.0);
        }
        Ok(completed as f64 / total as f64 * 100.0)
    }

    /// Total minutes per category, largest first.
    ///
    /// Categories whose tasks have no recorded time are left out.
    pub fn get_category_stats(&self) -> Result<Vec<CategoryTotal>, StoreError> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT c.name, SUM(tr.duration_minutes) AS total
             FROM categories c
             JOIN task_categories tc ON c.id = tc.category_id
             JOIN time_records tr ON tc.task_id = tr.task_id
             GROUP BY c.id
             ORDER BY total DESC, c.name ASC",
        )?;
        let totals = stmt
            .query_map([], |row| {
                Ok(CategoryTotal {
                    name: row.get(0)?,
                    minutes: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(totals)
    }
}
