use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use crate::api::handlers::{self, AppState};
use crate::api::{calendar_handlers, meeting_handlers};
use crate::model::EntityKind;
use crate::store::traits::Store;

/// Router for whichever registry this process serves.
pub fn create_router<S: Store + 'static>(kind: EntityKind) -> anyhow::Result<Router<AppState<S>>> {
    match kind {
        EntityKind::Calendars => Ok(create_calendar_router()),
        EntityKind::Meetings => Ok(create_meeting_router()),
        other => Err(anyhow::anyhow!(
            "{} are served by an external registry, not by this service",
            other
        )),
    }
}

pub fn create_calendar_router<S: Store + 'static>() -> Router<AppState<S>> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Collection
        .route("/calendars", get(calendar_handlers::list_calendars::<S>))
        .route("/calendars", post(calendar_handlers::create_calendar::<S>))
        .route("/calendars/:id", get(calendar_handlers::get_calendar::<S>))
        .route("/calendars/:id", put(calendar_handlers::update_calendar::<S>))
        .route("/calendars/:id", delete(calendar_handlers::delete_calendar::<S>))
        // Meetings on a calendar, batch form
        .route(
            "/calendars/:id/meetings",
            post(calendar_handlers::add_meetings::<S>),
        )
        .route(
            "/calendars/:id/meetings",
            delete(calendar_handlers::remove_meetings::<S>),
        )
        .route(
            "/calendars/:id/addMeetings",
            post(calendar_handlers::add_meetings::<S>),
        )
        .route(
            "/calendars/:id/removeMeetings",
            post(calendar_handlers::remove_meetings::<S>),
        )
        // Meetings on a calendar, one id in the path
        .route(
            "/calendars/:id/addMeeting/:meeting_id",
            get(calendar_handlers::add_meeting::<S>),
        )
        .route(
            "/calendars/:id/removeMeeting/:meeting_id",
            get(calendar_handlers::remove_meeting::<S>),
        )
        .route(
            "/calendars/:id/meetings/:meeting_id",
            delete(calendar_handlers::remove_meeting::<S>),
        )
        .fallback(handlers::route_not_found)
        .layer(middleware::map_response(handlers::envelope_method_not_allowed))
}

pub fn create_meeting_router<S: Store + 'static>() -> Router<AppState<S>> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Collection
        .route("/meetings", get(meeting_handlers::list_meetings::<S>))
        .route("/meetings", post(meeting_handlers::create_meeting::<S>))
        .route("/meetings/:id", get(meeting_handlers::get_meeting::<S>))
        .route("/meetings/:id", put(meeting_handlers::update_meeting::<S>))
        .route("/meetings/:id", delete(meeting_handlers::delete_meeting::<S>))
        // Batch relationship updates
        .route(
            "/meetings/:id/addCalendars",
            post(meeting_handlers::add_calendars::<S>),
        )
        .route(
            "/meetings/:id/removeCalendars",
            post(meeting_handlers::remove_calendars::<S>),
        )
        .route(
            "/meetings/:id/addParticipants",
            post(meeting_handlers::add_participants::<S>),
        )
        .route(
            "/meetings/:id/removeParticipants",
            post(meeting_handlers::remove_participants::<S>),
        )
        .route(
            "/meetings/:id/addAttachments",
            post(meeting_handlers::add_attachments::<S>),
        )
        .route(
            "/meetings/:id/removeAttachments",
            post(meeting_handlers::remove_attachments::<S>),
        )
        // Resource-style aliases; the attachments registry posts here
        .route(
            "/meetings/:id/calendars",
            post(meeting_handlers::add_calendars::<S>),
        )
        .route(
            "/meetings/:id/participants",
            post(meeting_handlers::add_participants::<S>),
        )
        .route(
            "/meetings/:id/attachments",
            post(meeting_handlers::add_attachments::<S>),
        )
        // One related id in the path
        .route(
            "/meetings/:id/addCalendar/:calendar_id",
            get(meeting_handlers::add_calendar::<S>),
        )
        .route(
            "/meetings/:id/removeCalendar/:calendar_id",
            get(meeting_handlers::remove_calendar::<S>),
        )
        .route(
            "/meetings/:id/addParticipant/:participant_id",
            get(meeting_handlers::add_participant::<S>),
        )
        .route(
            "/meetings/:id/removeParticipant/:participant_id",
            get(meeting_handlers::remove_participant::<S>),
        )
        .route(
            "/meetings/:id/addAttachment/:attachment_id",
            get(meeting_handlers::add_attachment::<S>),
        )
        .route(
            "/meetings/:id/removeAttachment/:attachment_id",
            get(meeting_handlers::remove_attachment::<S>),
        )
        // Resource-style removal; the attachments registry deletes through here
        .route(
            "/meetings/:id/calendars/:calendar_id",
            delete(meeting_handlers::remove_calendar::<S>),
        )
        .route(
            "/meetings/:id/participants/:participant_id",
            delete(meeting_handlers::remove_participant::<S>),
        )
        .route(
            "/meetings/:id/attachments/:attachment_id",
            delete(meeting_handlers::remove_attachment::<S>),
        )
        .fallback(handlers::route_not_found)
        .layer(middleware::map_response(handlers::envelope_method_not_allowed))
}
