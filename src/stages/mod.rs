pub mod stage0_normalize;
pub mod stage1_parse;
pub mod stage2_train;
pub mod stage3_predict;
pub mod stage4_evaluate;
pub mod stage5_report;

pub use stage0_normalize::*;
pub use stage1_parse::*;
pub use stage2_train::*;
pub use stage3_predict::*;
pub use stage4_evaluate::*;
pub use stage5_report::*;
