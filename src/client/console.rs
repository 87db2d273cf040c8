use crate::application_port::PagerOutcome;
use crate::client::*;
use crate::domain_port::Alerts;
use std::str::FromStr;
use tokio::io::{AsyncBufReadExt, BufReader};

pub const USAGE: &str = "commands: register <email> <password> | login <email> <password> | \
reset <email> | logout | send <text> | delete <n> | scroll <px> | top | show | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Register { email: String, password: String },
    Login { email: String, password: String },
    Reset { email: String },
    Logout,
    Send { text: String },
    /// 1-based position in the visible list.
    Delete { position: usize },
    Scroll { scroll_top: u32 },
    Show,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command: {0}")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        let args: Vec<&str> = rest.split_whitespace().collect();

        match verb {
            "" => Err(CommandError::Empty),
            "register" | "login" => match args.as_slice() {
                [email, password] => {
                    let (email, password) = (email.to_string(), password.to_string());
                    Ok(if verb == "register" {
                        Command::Register { email, password }
                    } else {
                        Command::Login { email, password }
                    })
                }
                _ => Err(CommandError::Usage("register|login <email> <password>")),
            },
            "reset" => match args.as_slice() {
                [email] => Ok(Command::Reset {
                    email: email.to_string(),
                }),
                _ => Err(CommandError::Usage("reset <email>")),
            },
            "logout" => Ok(Command::Logout),
            "send" => Ok(Command::Send {
                text: rest.to_owned(),
            }),
            "delete" => args
                .first()
                .and_then(|n| n.parse::<usize>().ok())
                .filter(|n| *n > 0)
                .map(|position| Command::Delete { position })
                .ok_or(CommandError::Usage("delete <n>")),
            "scroll" => args
                .first()
                .and_then(|px| px.parse::<u32>().ok())
                .map(|scroll_top| Command::Scroll { scroll_top })
                .ok_or(CommandError::Usage("scroll <px>")),
            "top" => Ok(Command::Scroll { scroll_top: 0 }),
            "show" => Ok(Command::Show),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(CommandError::Unknown(other.to_owned())),
        }
    }
}

/// Prints alerts to the terminal.
#[derive(Debug, Default)]
pub struct ConsoleAlerts;

impl Alerts for ConsoleAlerts {
    fn alert(&self, message: &str) {
        println!("! {}", message);
    }
}

pub fn format_page(page: &Page) -> String {
    match page {
        Page::Login => "[login] register, login or reset to continue".to_owned(),
        Page::SignedOut => SIGNED_OUT_NOTICE.to_owned(),
        Page::Chat {
            header,
            bubbles,
            can_send: _,
        } => {
            let mut out = format!("== {} ==", header);
            for (n, bubble) in bubbles.iter().enumerate() {
                let marker = if bubble.deletable { " [x]" } else { "" };
                out.push_str(&format!("\n{:>3}. {}: {}{}", n + 1, bubble.label, bubble.text, marker));
            }
            out
        }
    }
}

/// Runs one command. Returns false when the user asked to quit.
pub async fn execute(client: &mut ChatClient, command: Command) -> bool {
    match command {
        Command::Register { email, password } => {
            client.register(&email, &password).await;
        }
        Command::Login { email, password } => {
            client.login(&email, &password).await;
        }
        Command::Reset { email } => {
            client.reset_password(&email).await;
        }
        Command::Logout => {
            client.logout().await;
        }
        Command::Send { text } => {
            client.set_draft(&text);
            client.submit().await;
        }
        Command::Delete { position } => match client.bubbles().get(position - 1) {
            Some(bubble) if bubble.deletable => {
                client.delete(&bubble.id).await;
            }
            Some(_) => println!("! you can only delete your own messages"),
            None => println!("! no message at {}", position),
        },
        Command::Scroll { scroll_top } => match client.scroll(scroll_top) {
            PagerOutcome::Grew { to, .. } => println!("loading more (window {})", to),
            PagerOutcome::Exhausted => println!("all messages loaded"),
            PagerOutcome::NotNearTop => {}
        },
        Command::Show => println!("{}", format_page(&client.page())),
        Command::Quit => return false,
    }
    true
}

/// Line-oriented frontend: reads commands from stdin while applying
/// provider and store notifications as they arrive.
pub async fn run_console(client: &mut ChatClient) -> anyhow::Result<()> {
    enum Input {
        Line(Option<String>),
        Event(ClientEvent),
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("{}", USAGE);

    loop {
        let input = tokio::select! {
            line = lines.next_line() => Input::Line(line?),
            Some(event) = client.step() => Input::Event(event),
        };

        match input {
            Input::Line(None) => break,
            Input::Line(Some(line)) => match line.parse::<Command>() {
                Ok(command) => {
                    if !execute(client, command).await {
                        break;
                    }
                }
                Err(CommandError::Empty) => {}
                Err(e) => println!("! {}\n{}", e, USAGE),
            },
            Input::Event(ClientEvent::Session(transition)) => {
                tracing::debug!(?transition, "session event");
                println!("{}", format_page(&client.page()));
            }
            Input::Event(ClientEvent::Feed(crate::application_port::FeedUpdate::Messages { .. })) => {
                println!("{}", format_page(&client.page()));
            }
            Input::Event(ClientEvent::Feed(_)) => {}
        }
    }

    tracing::info!("console closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands() {
        assert_eq!(
            "register a@student.hs-rm.de secret1".parse::<Command>(),
            Ok(Command::Register {
                email: "a@student.hs-rm.de".to_owned(),
                password: "secret1".to_owned()
            })
        );
        assert_eq!(
            "send   hello  world ".parse::<Command>(),
            Ok(Command::Send {
                text: "hello  world".to_owned()
            })
        );
        assert_eq!("top".parse::<Command>(), Ok(Command::Scroll { scroll_top: 0 }));
        assert_eq!("delete 2".parse::<Command>(), Ok(Command::Delete { position: 2 }));
        assert_eq!("   ".parse::<Command>(), Err(CommandError::Empty));
    }

    #[test]
    fn rejects_bad_arguments() {
        assert!(matches!("delete 0".parse::<Command>(), Err(CommandError::Usage(_))));
        assert!(matches!("login a@b.de".parse::<Command>(), Err(CommandError::Usage(_))));
        assert!(matches!("scroll up".parse::<Command>(), Err(CommandError::Usage(_))));
        assert_eq!(
            "dance".parse::<Command>(),
            Err(CommandError::Unknown("dance".to_owned()))
        );
    }

    #[test]
    fn formats_chat_page_with_delete_markers() {
        let page = Page::Chat {
            header: "Logged in: a@student.hs-rm.de".to_owned(),
            bubbles: vec![
                MessageBubble {
                    id: crate::domain_model::MessageId("k1".to_owned()),
                    label: "bob".to_owned(),
                    text: "hey".to_owned(),
                    own: false,
                    deletable: false,
                },
                MessageBubble {
                    id: crate::domain_model::MessageId("k2".to_owned()),
                    label: "You".to_owned(),
                    text: "hello".to_owned(),
                    own: true,
                    deletable: true,
                },
            ],
            can_send: false,
        };

        assert_eq!(
            format_page(&page),
            "== Logged in: a@student.hs-rm.de ==\n  1. bob: hey\n  2. You: hello [x]"
        );
    }
}
