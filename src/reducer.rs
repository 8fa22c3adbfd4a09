use crate::models::{StoriesState, Story};

/// Every state transition the story list can make. The enum is closed on
/// purpose: an unhandled action kind is a compile error, not a runtime fault.
#[derive(Debug, Clone)]
pub enum StoriesAction {
    FetchInit,
    FetchSuccess(Vec<Story>),
    FetchFailure,
    RemoveStory(u64),
}

/// Compute the next state from the current state and one action. No side
/// effects; the UI dispatches into this and fetch results arrive as actions.
pub fn reduce(state: &mut StoriesState, action: StoriesAction) {
    log::trace!("{action:?}");
    match action {
        StoriesAction::FetchInit => {
            state.is_loading = true;
            state.is_error = false;
        }
        StoriesAction::FetchSuccess(stories) => {
            // The payload replaces the list entirely, never merges into it
            state.data = stories;
            state.is_loading = false;
            state.is_error = false;
        }
        StoriesAction::FetchFailure => {
            // Prior results stay visible behind the error message
            state.is_loading = false;
            state.is_error = true;
        }
        StoriesAction::RemoveStory(object_id) => {
            state.data.retain(|story| story.object_id != object_id);
        }
    }
}

/// Case-insensitive substring filter over story titles, applied live as the
/// user types without re-fetching.
pub fn filter_stories(stories: &[Story], query: &str) -> Vec<Story> {
    if query.is_empty() {
        return stories.to_vec();
    }

    let query = query.to_lowercase();
    stories
        .iter()
        .filter(|story| story.title.to_lowercase().contains(&query))
        .cloned()
        .collect()
}
