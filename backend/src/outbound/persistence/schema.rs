//! Diesel table definitions for the PostgreSQL schema.
//!
//! Must match the migrations exactly; regenerate with `diesel print-schema`
//! after a migration changes the shape.

diesel::table! {
    /// Credential identities.
    users (id) {
        id -> Uuid,
        /// Normalised login email, unique across the table.
        email -> Varchar,
        /// PHC-format Argon2id hash.
        password_hash -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Member profiles, one per user.
    members (id) {
        id -> Uuid,
        user_id -> Uuid,
        full_name -> Varchar,
        nickname -> Nullable<Varchar>,
        stateship_year -> Varchar,
        last_mowcub_position -> Varchar,
        current_council_office -> Varchar,
        status -> Varchar,
        role -> Varchar,
        latitude -> Nullable<Float8>,
        longitude -> Nullable<Float8>,
        photo_url -> Nullable<Text>,
        dues_proof_url -> Nullable<Text>,
        approved_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Satellite content records: kind discriminator plus JSON payload.
    content_items (id) {
        id -> Uuid,
        kind -> Varchar,
        author -> Uuid,
        payload -> Jsonb,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(members -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(users, members, content_items);
