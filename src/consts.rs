// Global safety caps to prevent pathological or infinite loops

// AST optimizer: maximum propagate+fold rounds per compilation
pub const OPTIMIZER_MAX_PASSES: usize = 10_000;
// Liveness: maximum backward sweeps per method
pub const LIVENESS_MAX_ITERS: usize = 100_000;

// Well-known type names
pub const INT: &str = "int";
pub const BOOLEAN: &str = "boolean";
pub const VOID: &str = "void";
pub const STRING: &str = "String";
/// Permissive type given to names the type system cannot resolve
pub const ANY: &str = "any";

pub const THIS: &str = "this";
pub const LENGTH: &str = "length";
pub const MAIN: &str = "main";

pub const OBJECT_PATH: &str = "java/lang/Object";
pub const STRING_PATH: &str = "java/lang/String";
pub const INIT: &str = "<init>";
