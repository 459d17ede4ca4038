//! SQL schema for the Marq SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS accounts (
    account_id   TEXT PRIMARY KEY,
    name         TEXT NOT NULL,
    platform_ref TEXT,
    share_token  TEXT NOT NULL UNIQUE,
    created_at   TEXT NOT NULL
);

-- Operator-entered monthly facts. One row per (account, month); rows are
-- upserted by hand and never deleted automatically. NULL columns mean 'no
-- manual entry yet', which is distinct from an explicit 0.
CREATE TABLE IF NOT EXISTS monthly_metrics (
    account_id             TEXT NOT NULL REFERENCES accounts(account_id),
    month                  TEXT NOT NULL,   -- ISO date, first day of month
    new_followers          REAL,
    appointments_scheduled REAL,
    appointments_showed    REAL,
    updated_at             TEXT NOT NULL,
    PRIMARY KEY (account_id, month)
);

-- Cached per-day insight values pulled from the ad platform by the sync job.
CREATE TABLE IF NOT EXISTS insights (
    account_id TEXT NOT NULL REFERENCES accounts(account_id),
    metric     TEXT NOT NULL,               -- snake_case Metric discriminant
    day        TEXT NOT NULL,               -- ISO date
    value      REAL NOT NULL,
    fetched_at TEXT NOT NULL,
    PRIMARY KEY (account_id, metric, day)
);

-- completed_at/final_value are written together, once, and never updated
-- afterwards; the guarded UPDATE in complete_goal enforces the one-way
-- transition.
CREATE TABLE IF NOT EXISTS goals (
    goal_id      TEXT PRIMARY KEY,
    account_id   TEXT NOT NULL REFERENCES accounts(account_id),
    metric       TEXT NOT NULL,
    target       REAL NOT NULL,
    period       TEXT NOT NULL,             -- 'monthly' | 'total'
    start_date   TEXT,
    archived     INTEGER NOT NULL DEFAULT 0,
    completed_at TEXT,
    final_value  REAL,
    created_at   TEXT NOT NULL,
    CHECK ((completed_at IS NULL) = (final_value IS NULL))
);

CREATE INDEX IF NOT EXISTS goals_account_idx   ON goals(account_id);
CREATE INDEX IF NOT EXISTS monthly_account_idx ON monthly_metrics(account_id);

PRAGMA user_version = 1;
";
