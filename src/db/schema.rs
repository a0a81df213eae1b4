pub const CREATE_TABLES: &str = "
CREATE TABLE IF NOT EXISTS documents (
    collection TEXT NOT NULL,
    id TEXT NOT NULL,
    data TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    PRIMARY KEY (collection, id)
);

CREATE INDEX IF NOT EXISTS idx_documents_created ON documents(collection, created_at);
CREATE INDEX IF NOT EXISTS idx_documents_status ON documents(collection, json_extract(data, '$.status'));
CREATE INDEX IF NOT EXISTS idx_documents_user ON documents(collection, json_extract(data, '$.user_id'));
";
