use sqlx::PgPool;

/// Handle that database query objects are processed against.
///
/// Each query is a plain struct with a `kanau::processor::Processor` impl on
/// this type, so callers hold one cheap clone of the pool and issue typed
/// queries through it.
#[derive(Debug, Clone)]
pub struct DatabaseProcessor {
    pub pool: PgPool,
}

impl DatabaseProcessor {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}
