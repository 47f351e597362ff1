//! Diesel table definitions for the Postgres backend.

diesel::table! {
    providers (category, id) {
        category -> Text,
        id -> Int8,
        name -> Text,
        locality -> Text,
        city -> Text,
        /// Full provider document (species, days, slots, menu, details).
        payload -> Jsonb,
    }
}

diesel::table! {
    reservations (id) {
        id -> Uuid,
        provider_id -> Int8,
        provider_category -> Text,
        requester_id -> Int8,
        pet_id -> Int8,
        service_id -> Int8,
        window_start -> Timestamptz,
        window_end -> Timestamptz,
        state -> Text,
        cancellation_reason -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    notifications (id) {
        id -> Uuid,
        recipient_id -> Int8,
        recipient_role -> Text,
        event -> Text,
        reservation_id -> Uuid,
        read -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(providers, reservations, notifications);
