pub mod condition;
pub mod types;

pub use condition::{ConditionFlat, ConditionList, Operator, ParameterType};
pub use types::{AllowanceConfig, ExecutionOptions, MetaTransaction, Operation, RoleKey};
