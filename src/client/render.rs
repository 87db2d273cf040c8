use crate::domain_model::*;

pub const SELF_LABEL: &str = "You";
pub const SIGNED_OUT_NOTICE: &str = "Please log in to see the chat.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageBubble {
    pub id: MessageId,
    pub label: String,
    pub text: String,
    pub own: bool,
    pub deletable: bool,
}

impl MessageBubble {
    pub fn for_viewer(message: &Message, viewer: &Session) -> Self {
        let own = message.is_authored_by(&viewer.user_id);
        let label = if own {
            SELF_LABEL.to_owned()
        } else {
            message.author_email.local_part().to_owned()
        };
        Self {
            id: message.id.clone(),
            label,
            text: message.text.clone(),
            own,
            deletable: own,
        }
    }
}

/// What the current route shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Page {
    Login,
    SignedOut,
    Chat {
        header: String,
        bubbles: Vec<MessageBubble>,
        can_send: bool,
    },
}

impl Page {
    pub fn render(
        route: Route,
        session: Option<&Session>,
        messages: &[Message],
        draft: &str,
    ) -> Self {
        match (route, session) {
            (Route::Login, _) => Page::Login,
            (Route::ChatRoot, None) => Page::SignedOut,
            (Route::ChatRoot, Some(session)) => Page::Chat {
                header: format!("Logged in: {}", session.email),
                bubbles: messages
                    .iter()
                    .map(|message| MessageBubble::for_viewer(message, session))
                    .collect(),
                can_send: !draft.trim().is_empty(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn session(email: &str) -> Session {
        Session {
            user_id: UserId::generate(),
            email: Email::new(email),
        }
    }

    fn message(id: &str, author: &Session, text: &str) -> Message {
        Message::from_record(
            MessageId(id.to_owned()),
            MessageRecord::compose(author, text, Utc::now()),
        )
    }

    #[test]
    fn own_bubble_is_labelled_you_and_deletable() {
        let alice = session("alice@student.hs-rm.de");
        let bubble = MessageBubble::for_viewer(&message("k1", &alice, "hi"), &alice);

        assert_eq!(bubble.label, "You");
        assert!(bubble.own);
        assert!(bubble.deletable);
    }

    #[test]
    fn foreign_bubble_shows_local_part_without_delete() {
        let alice = session("alice@student.hs-rm.de");
        let bob = session("bob.builder@student.hs-rm.de");
        let bubble = MessageBubble::for_viewer(&message("k1", &bob, "hi"), &alice);

        assert_eq!(bubble.label, "bob.builder");
        assert!(!bubble.deletable);
    }

    #[test]
    fn chat_page_requires_session() {
        assert_eq!(Page::render(Route::ChatRoot, None, &[], ""), Page::SignedOut);
        assert_eq!(Page::render(Route::Login, None, &[], ""), Page::Login);
    }

    #[test]
    fn send_is_enabled_only_for_non_blank_drafts() {
        let alice = session("alice@student.hs-rm.de");
        let blank = Page::render(Route::ChatRoot, Some(&alice), &[], "  ");
        let filled = Page::render(Route::ChatRoot, Some(&alice), &[], "x");

        assert!(matches!(blank, Page::Chat { can_send: false, .. }));
        assert!(matches!(
            filled,
            Page::Chat { can_send: true, ref header, .. } if header == "Logged in: alice@student.hs-rm.de"
        ));
    }
}
