//! Diesel schema for tool registry persistence.

diesel::table! {
    /// Tool server registrations.
    mcp_servers (id) {
        /// Internal server identifier.
        id -> Uuid,
        /// Display name; not unique.
        #[max_length = 100]
        name -> Varchar,
        /// Transport kind (`stdio`, `sse`, `streamable-http`).
        #[max_length = 32]
        transport_kind -> Varchar,
        /// STDIO command; null for network transports.
        command -> Nullable<Text>,
        /// STDIO arguments as a JSONB array.
        args -> Jsonb,
        /// Endpoint URL; null for STDIO transports.
        url -> Nullable<Text>,
        /// Declared environment as a JSONB object.
        env -> Jsonb,
        /// Whether the server takes part in discovery and dispatch.
        enabled -> Bool,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Persisted tool sets, one row per tool.
    mcp_server_tools (server_id, name) {
        /// Owning server.
        server_id -> Uuid,
        /// Tool name, unique per server.
        name -> Text,
        /// Position of the tool within its saved set.
        position -> Int4,
        /// Server name captured when the set was saved.
        #[max_length = 100]
        server_name -> Varchar,
        /// Tool description.
        description -> Text,
        /// JSON Schema of the tool input.
        input_schema -> Jsonb,
        /// Save timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Latest health snapshot per server.
    mcp_server_health (server_id) {
        /// Owning server.
        server_id -> Uuid,
        /// Health status (`unknown`, `healthy`, `degraded`, `unhealthy`).
        #[max_length = 20]
        status -> Varchar,
        /// Round-trip latency of the last successful check.
        latency_ms -> Nullable<Int8>,
        /// Failures since the last success.
        consecutive_failures -> Int4,
        /// Timestamp of the last check.
        last_checked_at -> Nullable<Timestamptz>,
        /// Timestamp of the last successful check.
        last_success_at -> Nullable<Timestamptz>,
        /// Error reported by the last failed check.
        last_error -> Nullable<Text>,
    }
}

diesel::table! {
    /// Caller-encrypted credentials.
    mcp_server_credentials (server_id, credential_key) {
        /// Owning server.
        server_id -> Uuid,
        /// Environment variable name.
        #[max_length = 255]
        credential_key -> Varchar,
        /// Ciphertext; never decrypted here.
        encrypted_value -> Text,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Global feature configuration entries.
    registry_config (config_key) {
        /// Configuration key.
        #[max_length = 64]
        config_key -> Varchar,
        /// JSON-encoded value.
        config_value -> Jsonb,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(
    mcp_servers,
    mcp_server_tools,
    mcp_server_health,
    mcp_server_credentials,
    registry_config,
);
