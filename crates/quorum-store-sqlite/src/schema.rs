//! SQL schema for the Quorum SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS journals (
    journal_id  TEXT PRIMARY KEY,
    title       TEXT NOT NULL,
    editor_id   TEXT NOT NULL,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS reviewers (
    reviewer_id TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    email       TEXT NOT NULL,
    created_at  TEXT NOT NULL
);

-- version increments on every write to the aggregate; version-gated
-- statements compare against it instead of locking.
CREATE TABLE IF NOT EXISTS articles (
    article_id   TEXT PRIMARY KEY,
    journal_id   TEXT NOT NULL REFERENCES journals(journal_id),
    submitter_id TEXT NOT NULL,
    title        TEXT NOT NULL,
    status       TEXT NOT NULL,   -- 'submitted' | 'pending' | 'under review'
                                  -- | 'approved' | 'rejected'
    comment      TEXT,
    submitted_at TEXT NOT NULL,   -- ISO 8601 UTC; store-assigned
    version      INTEGER NOT NULL DEFAULT 0
);

-- Assignments have no identity of their own; the composite key is the
-- ownership. The verdict triple is NULL until the review is submitted and is
-- written exactly once.
CREATE TABLE IF NOT EXISTS review_assignments (
    article_id  TEXT NOT NULL REFERENCES articles(article_id) ON DELETE CASCADE,
    reviewer_id TEXT NOT NULL REFERENCES reviewers(reviewer_id),
    assigned_at TEXT NOT NULL,
    verdict     TEXT,
    comment     TEXT,
    reviewed_at TEXT,
    PRIMARY KEY (article_id, reviewer_id),
    CHECK ((verdict IS NULL) = (reviewed_at IS NULL))
);

-- Reminder ledger: one row per (reviewer, article) pair, overwritten in
-- place. Review writes never touch this table.
CREATE TABLE IF NOT EXISTS reminders (
    reviewer_id  TEXT NOT NULL,
    article_id   TEXT NOT NULL REFERENCES articles(article_id) ON DELETE CASCADE,
    last_sent_at TEXT NOT NULL,
    PRIMARY KEY (reviewer_id, article_id)
);

CREATE INDEX IF NOT EXISTS articles_journal_idx ON articles(journal_id);
CREATE INDEX IF NOT EXISTS assignments_pending_idx
    ON review_assignments(assigned_at) WHERE reviewed_at IS NULL;

PRAGMA user_version = 1;
";
