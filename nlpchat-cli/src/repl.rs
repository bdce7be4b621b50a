//! Interactive command loop
//!
//! One line of input is either a built-in `/command` or a chat message sent
//! to the provider with the full session as context.

use console::style;
use nlpchat_core::session::{Session, SessionManager, Turn};
use nlpchat_providers::{LlmProvider, Message, ProviderError};
use std::sync::Arc;
use tracing::{info, warn};

/// What the caller should do after one handled line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopAction {
    Continue,
    Quit,
}

/// Chat parameters carried into every provider call
pub struct ChatSettings {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
    pub system_prompt: String,
}

/// The command loop state: one session, one provider
pub struct CommandLoop {
    provider: Arc<dyn LlmProvider>,
    manager: SessionManager,
    settings: ChatSettings,
    session: Session,
}

impl CommandLoop {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        manager: SessionManager,
        settings: ChatSettings,
    ) -> Self {
        Self {
            provider,
            manager,
            settings,
            session: Session::new(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Replace the current session wholesale (used by `--load` at startup)
    pub fn replace_session(&mut self, session: Session) {
        self.session = session;
    }

    /// Handle one line of input. Every failure is reported and the loop
    /// continues; only `/quit` ends it.
    pub async fn handle_line(&mut self, line: &str) -> LoopAction {
        let line = line.trim();
        if line.is_empty() {
            return LoopAction::Continue;
        }

        if line.starts_with('/') {
            return self.handle_command(line);
        }

        self.chat(line).await;
        LoopAction::Continue
    }

    fn handle_command(&mut self, line: &str) -> LoopAction {
        let (command, arg) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, Some(rest.trim())),
            None => (line, None),
        };
        let arg = arg.filter(|a| !a.is_empty());

        match command.to_lowercase().as_str() {
            "/quit" | "/exit" => {
                println!("{}", style("Goodbye!").cyan());
                return LoopAction::Quit;
            }
            "/help" => print_help(),
            "/clear" => {
                self.session.clear();
                println!("{}", style("Conversation history cleared.").green());
            }
            "/save" => match self.manager.save(&self.session, arg) {
                Ok(path) => {
                    info!("Saved conversation to {:?}", path);
                    println!(
                        "{} {}",
                        style("Conversation saved to").green(),
                        path.display()
                    );
                }
                Err(e) => {
                    warn!("Failed to save conversation: {}", e);
                    println!("{} {}", style("Error saving conversation:").red(), e);
                }
            },
            "/load" => match arg {
                Some(name) => match self.manager.load(name) {
                    Ok(session) => {
                        println!(
                            "{} ({} turns)",
                            style("Conversation loaded.").green(),
                            session.len()
                        );
                        self.session = session;
                    }
                    Err(e) => {
                        warn!("Failed to load conversation: {}", e);
                        println!("{} {}", style("Error loading conversation:").red(), e);
                    }
                },
                None => println!(
                    "{}",
                    style("Please specify a conversation to load.").yellow()
                ),
            },
            "/model" => println!("Current model: {}", self.settings.model),
            other => println!(
                "{} {}. Type {} for available commands.",
                style("Unknown command:").yellow(),
                other,
                style("/help").cyan()
            ),
        }

        LoopAction::Continue
    }

    /// Send one user message with the full session as context. Exactly two
    /// turns are appended on success; a failed call leaves the session as
    /// it was.
    async fn chat(&mut self, text: &str) {
        let mut messages = Vec::with_capacity(self.session.len() + 2);
        messages.push(Message::system(&self.settings.system_prompt));
        for turn in self.session.turns() {
            messages.push(Message {
                role: turn.role.to_string(),
                content: turn.content.clone(),
            });
        }
        messages.push(Message::user(text));

        let result = self
            .provider
            .chat(
                messages,
                Some(self.settings.model.clone()),
                self.settings.max_tokens,
                self.settings.temperature,
            )
            .await;

        match result {
            Ok(reply) => match reply.content {
                Some(content) if !content.is_empty() => {
                    self.session.append(Turn::user(text));
                    self.session.append(Turn::assistant(&content));
                    println!("{} {}", style("assistant:").green().bold(), content);
                }
                _ => {
                    warn!("Provider returned an empty reply");
                    println!("{}", style("The model returned an empty reply.").red());
                }
            },
            Err(ProviderError::MissingApiKey) => {
                println!(
                    "{}",
                    style("No API key configured; set OPENROUTER_API_KEY and restart.").red()
                );
            }
            Err(e) => {
                warn!("Chat request failed: {}", e);
                println!("{} {}", style("Request failed:").red(), e);
            }
        }
    }
}

fn print_help() {
    println!(
        "\nAvailable commands:\n\
         \x20 /help          - Show this help message\n\
         \x20 /clear         - Clear conversation history\n\
         \x20 /save [name]   - Save conversation (timestamped name if omitted)\n\
         \x20 /load <name>   - Load a saved conversation\n\
         \x20 /model         - Show the current model\n\
         \x20 /quit or /exit - Exit the chatbot\n\n\
         Just type your message to chat with the NLP assistant!\n"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use nlpchat_core::session::Role;
    use nlpchat_providers::{ChatReply, ProviderResult, TokenUsage};
    use tempfile::TempDir;

    /// Provider that always answers with a fixed reply, or always fails
    struct ScriptedProvider {
        reply: Option<String>,
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        async fn chat(
            &self,
            _messages: Vec<Message>,
            _model: Option<String>,
            _max_tokens: u32,
            _temperature: f64,
        ) -> ProviderResult<ChatReply> {
            match &self.reply {
                Some(content) => Ok(ChatReply {
                    content: Some(content.clone()),
                    finish_reason: "stop".to_string(),
                    usage: TokenUsage::default(),
                }),
                None => Err(ProviderError::Api("HTTP 500: boom".to_string())),
            }
        }

        fn default_model(&self) -> String {
            "test-model".to_string()
        }
    }

    fn command_loop(dir: &TempDir, reply: Option<&str>) -> CommandLoop {
        CommandLoop::new(
            Arc::new(ScriptedProvider {
                reply: reply.map(str::to_string),
            }),
            SessionManager::new(dir.path()),
            ChatSettings {
                model: "test-model".to_string(),
                max_tokens: 1000,
                temperature: 0.7,
                system_prompt: "You are an NLP assistant.".to_string(),
            },
        )
    }

    #[tokio::test]
    async fn test_successful_exchange_appends_user_then_assistant() {
        let dir = TempDir::new().unwrap();
        let mut repl = command_loop(&dir, Some("A fine question."));

        let action = repl.handle_line("What is a corpus?").await;

        assert_eq!(action, LoopAction::Continue);
        let turns = repl.session().turns();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, Role::User);
        assert_eq!(turns[0].content, "What is a corpus?");
        assert_eq!(turns[1].role, Role::Assistant);
        assert_eq!(turns[1].content, "A fine question.");
    }

    #[tokio::test]
    async fn test_failed_call_leaves_session_unmodified() {
        let dir = TempDir::new().unwrap();
        let mut repl = command_loop(&dir, None);

        repl.handle_line("Hello?").await;

        assert!(repl.session().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_command_never_mutates_session() {
        let dir = TempDir::new().unwrap();
        let mut repl = command_loop(&dir, Some("unused"));
        repl.handle_line("seed the history").await;
        let before = repl.session().turns().to_vec();

        let action = repl.handle_line("/frobnicate now").await;

        assert_eq!(action, LoopAction::Continue);
        assert_eq!(repl.session().turns(), before.as_slice());
    }

    #[tokio::test]
    async fn test_clear_then_query_leaves_one_pair() {
        let dir = TempDir::new().unwrap();
        let mut repl = command_loop(&dir, Some("fresh answer"));
        repl.handle_line("old question").await;
        assert_eq!(repl.session().len(), 2);

        repl.handle_line("/clear").await;
        assert!(repl.session().is_empty());

        repl.handle_line("new question").await;
        assert_eq!(repl.session().len(), 2);
    }

    #[tokio::test]
    async fn test_load_missing_file_keeps_current_session() {
        let dir = TempDir::new().unwrap();
        let mut repl = command_loop(&dir, Some("kept"));
        repl.handle_line("remember me").await;
        let before = repl.session().turns().to_vec();

        repl.handle_line("/load does-not-exist").await;

        assert_eq!(repl.session().turns(), before.as_slice());
    }

    #[tokio::test]
    async fn test_save_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let mut repl = command_loop(&dir, Some("saved reply"));
        repl.handle_line("save this exchange").await;
        let saved_turns = repl.session().turns().to_vec();

        repl.handle_line("/save exchange").await;
        repl.handle_line("/clear").await;
        assert!(repl.session().is_empty());

        repl.handle_line("/load exchange").await;
        assert_eq!(repl.session().turns(), saved_turns.as_slice());
    }

    #[tokio::test]
    async fn test_quit_and_exit_end_the_loop() {
        let dir = TempDir::new().unwrap();
        let mut repl = command_loop(&dir, Some("unused"));

        assert_eq!(repl.handle_line("/quit").await, LoopAction::Quit);
        assert_eq!(repl.handle_line("/exit").await, LoopAction::Quit);
    }

    /// Provider that records every request it receives
    struct RecordingProvider {
        calls: std::sync::Mutex<Vec<Vec<Message>>>,
    }

    #[async_trait]
    impl LlmProvider for RecordingProvider {
        async fn chat(
            &self,
            messages: Vec<Message>,
            _model: Option<String>,
            _max_tokens: u32,
            _temperature: f64,
        ) -> ProviderResult<ChatReply> {
            self.calls.lock().unwrap().push(messages);
            Ok(ChatReply {
                content: Some("ok".to_string()),
                finish_reason: "stop".to_string(),
                usage: TokenUsage::default(),
            })
        }

        fn default_model(&self) -> String {
            "test-model".to_string()
        }
    }

    #[tokio::test]
    async fn test_request_carries_prompt_and_history_roles() {
        let dir = TempDir::new().unwrap();
        let provider = Arc::new(RecordingProvider {
            calls: std::sync::Mutex::new(Vec::new()),
        });
        let mut repl = CommandLoop::new(
            provider.clone(),
            SessionManager::new(dir.path()),
            ChatSettings {
                model: "test-model".to_string(),
                max_tokens: 1000,
                temperature: 0.7,
                system_prompt: "You are an NLP assistant.".to_string(),
            },
        );

        repl.handle_line("first question").await;
        repl.handle_line("second question").await;

        let calls = provider.calls.lock().unwrap();
        let roles: Vec<&str> = calls[1].iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, ["system", "user", "assistant", "user"]);
        assert_eq!(calls[1][0].content, "You are an NLP assistant.");
        assert_eq!(calls[1][3].content, "second question");
    }

    #[tokio::test]
    async fn test_empty_input_is_ignored() {
        let dir = TempDir::new().unwrap();
        let mut repl = command_loop(&dir, Some("unused"));

        assert_eq!(repl.handle_line("   ").await, LoopAction::Continue);
        assert!(repl.session().is_empty());
    }

    #[tokio::test]
    async fn test_load_without_argument_is_usage_error() {
        let dir = TempDir::new().unwrap();
        let mut repl = command_loop(&dir, Some("unused"));

        repl.handle_line("/load").await;
        assert!(repl.session().is_empty());
    }
}
