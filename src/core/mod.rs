// Request orchestration: decode -> plan -> count + page -> expand -> assemble

pub mod engine;

pub use engine::CrudEngine;
