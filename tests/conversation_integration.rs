//! Integration tests for the teaching workflow through the `Bot` facade.

use std::sync::Arc;

use parley::bot::Bot;
use parley::conversation::{replies, Status};
use parley::store::{KnowledgeStore, MemoryStore};
use parley::types::config::BotConfig;
use parley::types::{ChatId, ChatKind, InboundEvent};

fn bot_with_store() -> (Arc<MemoryStore>, Bot) {
    let store = Arc::new(MemoryStore::new());
    let bot = Bot::new(store.clone(), &BotConfig::default());
    (store, bot)
}

async fn say(bot: &Bot, event: InboundEvent) -> Option<String> {
    bot.handle(event).await.map(|r| r.text)
}

async fn teach(bot: &Bot, chat: i64, question: &str, answer: &str) {
    say(bot, InboundEvent::command(chat, "learn")).await;
    say(bot, InboundEvent::private(chat, question)).await;
    let ack = say(bot, InboundEvent::private(chat, answer)).await.unwrap();
    assert!(replies::ACKNOWLEDGEMENTS.contains(&ack.as_str()), "unexpected reply {ack:?}");
}

#[tokio::test]
async fn test_learn_then_recall_exact() {
    let (_, bot) = bot_with_store();

    teach(&bot, 1, "what is rust", "a language").await;

    assert_eq!(bot.conversation(ChatId(1)).await.unwrap().status, Status::Idle);
    assert_eq!(
        say(&bot, InboundEvent::private(1, "what is rust")).await.as_deref(),
        Some("a language")
    );
}

#[tokio::test]
async fn test_pattern_with_capture() {
    let (_, bot) = bot_with_store();

    teach(&bot, 1, r"^my name is (?P<name>\w+)", "Hi {name}!").await;

    assert_eq!(
        say(&bot, InboundEvent::private(1, "my name is Bob")).await.as_deref(),
        Some("Hi Bob!")
    );
}

#[tokio::test]
async fn test_learned_knowledge_is_shared_between_conversations() {
    let (_, bot) = bot_with_store();

    teach(&bot, 1, "ping", "pong").await;

    assert_eq!(
        say(&bot, InboundEvent::private(2, "ping")).await.as_deref(),
        Some("pong")
    );
}

#[tokio::test]
async fn test_invalid_pattern_leaves_state_and_store() {
    let (store, bot) = bot_with_store();

    say(&bot, InboundEvent::command(1, "learn")).await;
    assert_eq!(
        say(&bot, InboundEvent::private(1, "^(?P<broken")).await.as_deref(),
        Some(replies::INVALID_PATTERN)
    );

    assert_eq!(
        bot.conversation(ChatId(1)).await.unwrap().status,
        Status::LearningQuestion
    );
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_forget_semantics() {
    let (store, bot) = bot_with_store();
    teach(&bot, 1, "keep", "kept").await;
    teach(&bot, 1, "drop", "dropped").await;

    say(&bot, InboundEvent::command(1, "forget")).await;
    assert_eq!(
        say(&bot, InboundEvent::private(1, "never learned")).await.as_deref(),
        Some(replies::NOT_FOUND)
    );
    assert_eq!(store.get("keep").await.unwrap().as_deref(), Some("kept"));
    assert_eq!(store.get("drop").await.unwrap().as_deref(), Some("dropped"));

    say(&bot, InboundEvent::command(1, "forget")).await;
    assert_eq!(
        say(&bot, InboundEvent::private(1, "drop")).await.as_deref(),
        Some(replies::FORGOTTEN)
    );
    assert_eq!(
        say(&bot, InboundEvent::private(1, "drop")).await.as_deref(),
        Some(replies::UNKNOWN)
    );
    assert_eq!(store.get("keep").await.unwrap().as_deref(), Some("kept"));
}

#[tokio::test]
async fn test_group_requires_wake_word() {
    let (_, bot) = bot_with_store();
    teach(&bot, 1, "ping", "pong").await;

    assert_eq!(say(&bot, InboundEvent::group(-10, "ping")).await, None);
    assert_eq!(
        say(&bot, InboundEvent::group(-10, "hey ping")).await.as_deref(),
        Some("pong")
    );

    // The same text in a private conversation always gets a reply.
    assert_eq!(
        say(&bot, InboundEvent::private(3, "ping")).await.as_deref(),
        Some("pong")
    );
    assert_eq!(
        say(&bot, InboundEvent::private(3, "unheard of")).await.as_deref(),
        Some(replies::UNKNOWN)
    );
}

#[tokio::test]
async fn test_custom_wake_words() {
    let config = BotConfig {
        wake_words: vec!["parley".to_string()],
        ..BotConfig::default()
    };
    let bot = Bot::new(Arc::new(MemoryStore::new()), &config);

    assert_eq!(say(&bot, InboundEvent::group(-1, "hey there")).await, None);
    assert_eq!(
        say(&bot, InboundEvent::group(-1, "parley there")).await.as_deref(),
        Some(replies::UNKNOWN)
    );
}

#[tokio::test]
async fn test_group_teaching_flow_needs_wake_word_on_each_message() {
    let (_, bot) = bot_with_store();
    let command = InboundEvent::Command {
        chat_id: ChatId(-4),
        chat_kind: ChatKind::Supergroup,
        sender_id: Some(11),
        name: "learn".to_string(),
    };

    assert_eq!(say(&bot, command).await.as_deref(), Some(replies::ASK_QUESTION));
    // Chatter between members does not advance the conversation.
    assert_eq!(say(&bot, InboundEvent::group(-4, "lol")).await, None);
    assert_eq!(
        say(&bot, InboundEvent::group(-4, "hey weather")).await.as_deref(),
        Some(replies::ASK_ANSWER)
    );
    say(&bot, InboundEvent::group(-4, "hey sunny")).await;

    assert_eq!(
        say(&bot, InboundEvent::group(-4, "hey weather")).await.as_deref(),
        Some("sunny")
    );
}

#[tokio::test]
async fn test_unknown_lookup_is_idempotent() {
    let (store, bot) = bot_with_store();
    teach(&bot, 1, "a", "b").await;

    let first = say(&bot, InboundEvent::private(1, "zzz")).await;
    let second = say(&bot, InboundEvent::private(1, "zzz")).await;

    assert_eq!(first.as_deref(), Some(replies::UNKNOWN));
    assert_eq!(first, second);
    assert_eq!(store.keys().await.unwrap(), vec!["a".to_string()]);
}

#[tokio::test]
async fn test_cache_holds_every_pattern_in_learning_order() {
    let (_, bot) = bot_with_store();

    teach(&bot, 1, "^hi", "first").await;
    teach(&bot, 1, "^hi there", "second").await;
    teach(&bot, 1, "plain", "not a pattern").await;
    teach(&bot, 1, r"^bye (?P<who>\w+)", "bye {who}").await;

    assert_eq!(bot.cache_stats().await.entries, Some(3));

    // Both patterns match; the one learned first wins, every time.
    for _ in 0..3 {
        assert_eq!(
            say(&bot, InboundEvent::private(1, "hi there")).await.as_deref(),
            Some("first")
        );
    }
}

#[tokio::test]
async fn test_out_of_band_delete_desyncs_once() {
    let (store, bot) = bot_with_store();
    teach(&bot, 1, "^hello", "hi!").await;

    store.delete("^hello").await.unwrap();

    assert_eq!(
        say(&bot, InboundEvent::private(1, "hello")).await.as_deref(),
        Some(replies::DESYNC)
    );
    assert_eq!(bot.cache_stats().await.entries, Some(0));
    assert_eq!(
        say(&bot, InboundEvent::private(1, "hello")).await.as_deref(),
        Some(replies::UNKNOWN)
    );
}

#[tokio::test]
async fn test_store_outage_is_retryable() {
    let (store, bot) = bot_with_store();
    say(&bot, InboundEvent::command(1, "learn")).await;
    say(&bot, InboundEvent::private(1, "q")).await;

    store.set_available(false);
    assert_eq!(
        say(&bot, InboundEvent::private(1, "a")).await.as_deref(),
        Some(replies::STORE_FAILURE)
    );
    assert_eq!(
        bot.conversation(ChatId(1)).await.unwrap().status,
        Status::LearningAnswer
    );

    store.set_available(true);
    say(&bot, InboundEvent::private(1, "a")).await;
    assert_eq!(
        say(&bot, InboundEvent::private(1, "q")).await.as_deref(),
        Some("a")
    );
}

#[tokio::test]
async fn test_conversations_run_concurrently_in_isolation() {
    let (store, bot) = bot_with_store();
    let bot = Arc::new(bot);

    let mut tasks = Vec::new();
    for chat in 1..=16i64 {
        let bot = bot.clone();
        tasks.push(tokio::spawn(async move {
            bot.handle(InboundEvent::command(chat, "learn")).await;
            bot.handle(InboundEvent::private(chat, format!("question {chat}")))
                .await;
            bot.handle(InboundEvent::private(chat, format!("answer {chat}")))
                .await;
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(store.len().await, 16);
    for chat in 1..=16i64 {
        assert_eq!(
            store.get(&format!("question {chat}")).await.unwrap(),
            Some(format!("answer {chat}"))
        );
        assert_eq!(
            bot.conversation(ChatId(chat)).await.unwrap().status,
            Status::Idle
        );
    }
}
