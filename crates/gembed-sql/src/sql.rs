//! SQL declarations for the embedding functions.

use crate::cursor::EmbeddingRow;

/// Default module path the engine loads the functions from.
pub const DEFAULT_MODULE_PATH: &str = "MODULE_PATHNAME";

/// Name of the one-shot function.
pub const GENERATE_EMBEDDINGS: &str = "generate_embeddings";

/// Name of the set-returning function.
pub const GENERATE_EMBEDDINGS_WITH_IDS: &str = "generate_embeddings_with_ids";

/// Render the `CREATE FUNCTION` statements for both functions.
pub fn extension_sql(module_path: &str) -> String {
    let columns = EmbeddingRow::COLUMNS
        .iter()
        .map(|(name, ty)| format!("{} {}", name, ty))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "CREATE FUNCTION {one_shot}(method text, model text, texts text[])\n\
         RETURNS vector[]\n\
         AS '{module}', '{one_shot}'\n\
         LANGUAGE c STRICT;\n\
         \n\
         CREATE FUNCTION {with_ids}(method text, model text, ids int4[], texts text[])\n\
         RETURNS TABLE({columns})\n\
         AS '{module}', '{with_ids}'\n\
         LANGUAGE c STRICT;\n",
        one_shot = GENERATE_EMBEDDINGS,
        with_ids = GENERATE_EMBEDDINGS_WITH_IDS,
        module = module_path,
        columns = columns,
    )
}
