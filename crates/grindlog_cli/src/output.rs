//! Human and JSON rendering for CLI results.

use anyhow::Result;
use grindlog_core::{CurrentAggregate, DailyCompletionCount, DailySnapshot, Item, TopicSummary};
use serde::Serialize;

pub struct Output {
    json: bool,
}

impl Output {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    pub fn message(&self, text: &str) -> Result<()> {
        if self.json {
            return self.emit_json(&serde_json::json!({ "message": text }));
        }
        println!("{text}");
        Ok(())
    }

    pub fn aggregate(&self, aggregate: &CurrentAggregate) -> Result<()> {
        if self.json {
            return self.emit_json(aggregate);
        }
        let counts = aggregate.counts;
        println!(
            "total={} completed={} in_progress={} todo={}",
            counts.total, counts.completed, counts.in_progress, counts.todo
        );
        Ok(())
    }

    pub fn snapshots(&self, snapshots: &[DailySnapshot]) -> Result<()> {
        if self.json {
            return self.emit_json(&snapshots);
        }
        for snapshot in snapshots {
            let counts = snapshot.counts;
            println!(
                "{} total={} completed={} in_progress={} todo={}",
                snapshot.date, counts.total, counts.completed, counts.in_progress, counts.todo
            );
        }
        Ok(())
    }

    pub fn completions(&self, series: &[DailyCompletionCount]) -> Result<()> {
        if self.json {
            return self.emit_json(&series);
        }
        for point in series {
            println!("{} {}", point.date, point.completed);
        }
        Ok(())
    }

    pub fn items(&self, items: &[Item]) -> Result<()> {
        if self.json {
            return self.emit_json(&items);
        }
        for item in items {
            let flag = if item.is_important { "*" } else { " " };
            println!(
                "{flag} {} #{} {:?} {:?} {}",
                item.id, item.external_number, item.status, item.difficulty, item.title
            );
        }
        Ok(())
    }

    pub fn topics(&self, topics: &[TopicSummary]) -> Result<()> {
        if self.json {
            return self.emit_json(&topics);
        }
        for summary in topics {
            println!(
                "{} {} ({} items)",
                summary.topic.id, summary.topic.name, summary.item_count
            );
        }
        Ok(())
    }

    fn emit_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}
