//! Assembles a controller's sub-router: active verbs wired to handlers
//! under the derived paths, behind the baseline layers: request-body
//! limit first, then scratch namespace init.

use crate::handlers::resource::{create, destroy, list, read, update};
use crate::middleware::Verb;
use crate::scratch::attach_scratch;
use crate::state::ControllerState;
use axum::extract::DefaultBodyLimit;
use axum::routing::MethodRouter;
use axum::Router;
use tower::ServiceBuilder;

/// JSON bodies are capped at 256 KiB.
const BODY_LIMIT_BYTES: usize = 256 * 1024;

pub fn resource_router(state: ControllerState) -> Router {
    let settings = &state.settings;
    let get_enabled = settings.verb_enabled(Verb::Get);
    let post_enabled = settings.verb_enabled(Verb::Post);
    let put_enabled = settings.verb_enabled(Verb::Put);
    let delete_enabled = settings.verb_enabled(Verb::Delete);

    let mut collection: MethodRouter<ControllerState> = MethodRouter::new();
    if get_enabled {
        collection = collection.get(list);
    }
    if post_enabled {
        collection = collection.post(create);
    }

    let mut instance: MethodRouter<ControllerState> = MethodRouter::new();
    if get_enabled {
        instance = instance.get(read);
    }
    if put_enabled {
        instance = instance.put(update);
    }
    if delete_enabled {
        instance = instance.delete(destroy);
    }

    let mut router: Router<ControllerState> = Router::new();
    if get_enabled || post_enabled {
        router = router.route(&settings.base_path, collection);
    }
    if get_enabled || put_enabled || delete_enabled {
        router = router.route(&settings.base_path_with_id, instance);
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
                .layer(axum::middleware::from_fn(attach_scratch)),
        )
        .with_state(state)
}
