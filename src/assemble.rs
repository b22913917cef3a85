//! # Result Assembler
//! Shapes analysis reports into the JSON the presentation layer reads.
//! Only renames and nests fields; no computation happens here.

use serde_json::{json, Map, Value};

use crate::catalog::Platform;
use crate::pipeline::AnalysisReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    News,
    Reviews,
}

impl Role {
    /// Key the highlighted items are published under.
    pub fn items_key(self) -> &'static str {
        match self {
            Role::News => "topNews",
            Role::Reviews => "topReviews",
        }
    }

    /// Key of the section in a multi-section response.
    pub fn section_key(self) -> &'static str {
        match self {
            Role::News => "news",
            Role::Reviews => "reviews",
        }
    }
}

/// `{overallSentiment, topNews|topReviews, error?, itemCount, failedSources,
/// sourceCounts, label, trend, aspects, summary?}`
pub fn assemble_flat(role: Role, report: &AnalysisReport) -> Value {
    let mut obj = match serde_json::to_value(&report.aggregate) {
        Ok(Value::Object(m)) => m,
        _ => Map::new(),
    };
    if let Some(items) = obj.remove("topItems") {
        obj.insert(role.items_key().to_string(), items);
    }

    let ins = &report.insights;
    obj.insert("label".into(), json!(ins.label));
    obj.insert("trend".into(), json!(ins.trend));
    obj.insert("aspects".into(), json!(ins.aspects));
    if let Some(s) = &report.summary {
        obj.insert("summary".into(), Value::String(s.clone()));
    }
    Value::Object(obj)
}

/// One section without platform metadata stays flat; anything else nests
/// each section under its role key next to `platform`.
pub fn assemble(platform: Option<&Platform>, sections: &[(Role, &AnalysisReport)]) -> Value {
    if let (None, [(role, report)]) = (platform, sections) {
        return assemble_flat(*role, report);
    }

    let mut obj = Map::new();
    if let Some(p) = platform {
        obj.insert("platform".into(), json!(p));
    }
    for (role, report) in sections {
        obj.insert(role.section_key().into(), assemble_flat(*role, report));
    }
    Value::Object(obj)
}
