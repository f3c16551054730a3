pub mod callback_router;
