//! CQRS mediator wiring
//!
//! Registers every command and query handler behind a single dispatch
//! point. Route handlers call the `handle` functions directly; the
//! mediator is the seam for callers that need uniform dispatch (internal
//! tooling, future background consumers).

pub use mediator::DefaultAsyncMediator;

use crate::features::FeatureState;

pub type AppMediator = DefaultAsyncMediator;

pub fn build_mediator(state: FeatureState) -> AppMediator {
    DefaultAsyncMediator::builder()
        // Documents
        .add_handler({
            let state = state.clone();
            move |query| {
                let state = state.clone();
                async move { crate::features::documents::queries::get_document::handle(state, query).await }
            }
        })
        // Ingestion commands
        .add_handler({
            let state = state.clone();
            move |cmd| {
                let state = state.clone();
                async move { crate::features::ingestion::commands::trigger::handle(state, cmd).await }
            }
        })
        .add_handler({
            let state = state.clone();
            move |cmd| {
                let state = state.clone();
                async move { crate::features::ingestion::commands::update_status::handle(state, cmd).await }
            }
        })
        .add_handler({
            let state = state.clone();
            move |cmd| {
                let state = state.clone();
                async move { crate::features::ingestion::commands::cancel::handle(state, cmd).await }
            }
        })
        .add_handler({
            let state = state.clone();
            move |cmd| {
                let state = state.clone();
                async move { crate::features::ingestion::commands::retry::handle(state, cmd).await }
            }
        })
        .add_handler({
            let state = state.clone();
            move |cmd| {
                let state = state.clone();
                async move { crate::features::ingestion::commands::force_fail::handle(state, cmd).await }
            }
        })
        .add_handler({
            let state = state.clone();
            move |cmd| {
                let state = state.clone();
                async move { crate::features::ingestion::commands::delete::handle(state, cmd).await }
            }
        })
        .add_handler({
            let state = state.clone();
            move |cmd| {
                let state = state.clone();
                async move { crate::features::ingestion::commands::delete::handle_all(state, cmd).await }
            }
        })
        // Ingestion queries
        .add_handler({
            let state = state.clone();
            move |query| {
                let state = state.clone();
                async move { crate::features::ingestion::queries::get_job::handle(state, query).await }
            }
        })
        .add_handler({
            let state = state.clone();
            move |query| {
                let state = state.clone();
                async move { crate::features::ingestion::queries::list_jobs::handle_list(state, query).await }
            }
        })
        .add_handler({
            let state = state.clone();
            move |query| {
                let state = state.clone();
                async move { crate::features::ingestion::queries::list_jobs::handle_list_mine(state, query).await }
            }
        })
        .add_handler({
            let state = state.clone();
            move |query| {
                let state = state.clone();
                async move { crate::features::ingestion::queries::stats::handle(state, query).await }
            }
        })
        // Webhook ingress
        .add_handler({
            let state = state.clone();
            move |report| {
                let state = state.clone();
                async move { crate::features::ingestion::webhook::handle(state, report).await }
            }
        })
        .build()
}
