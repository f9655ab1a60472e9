diesel::table! {
    idempotency_markers (request_id) {
        request_id -> Varchar,
        created_at -> Timestamptz,
        expires_at -> Timestamptz,
    }
}

diesel::table! {
    stock (sku) {
        sku -> Varchar,
        qty -> Int8,
        updated_at -> Nullable<Timestamptz>,
    }
}

diesel::allow_tables_to_appear_in_same_query!(
    idempotency_markers,
    stock,
);
