//! 対話型コマンドラインフロントエンド
//!
//! A thin presentation layer over [`App`]: parses one command per line,
//! prints Japanese prompts, and owns the card flip state (the flip is
//! cosmetic, so it never reaches the application layer).

use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use tangocho::config::Config;
use tangocho::logging;
use tangocho::models::{BookId, QuestionDirection};
use tangocho::session::{Advance, Answer};
use tangocho::App;
use tangocho::app::LoginOutcome;

type Input = Lines<BufReader<Stdin>>;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let config = Config::from_env();
    let _log_guard = logging::init_tracing(&config.log_level);
    tracing::info!(
        data_dir = %config.data_dir.display(),
        api = %config.api_base_url,
        "tangocho starting"
    );

    let mut app = App::new(&config);
    app.load().await;

    println!("単語帳アプリへようこそ。「help」でコマンド一覧を表示します。");
    let mut input = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt(&app);
        let line = match input.next_line().await {
            Ok(Some(line)) => line,
            _ => break,
        };
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }
        if !dispatch(&mut app, &line, &mut input).await {
            break;
        }
    }
    println!("さようなら。");
}

fn prompt(app: &App) {
    let mode = app.user_id().unwrap_or("ゲスト");
    print!("[{mode}] > ");
    std::io::stdout().flush().ok();
}

async fn dispatch(app: &mut App, line: &str, input: &mut Input) -> bool {
    let mut parts = line.split_whitespace();
    let command = parts.next().unwrap_or_default();
    let rest: Vec<&str> = parts.collect();

    match command {
        "help" => print_help(),
        "list" => list_books(app),
        "create" => {
            let name = rest.join(" ");
            match app.create_wordbook(&name).await {
                Ok(_) => println!("単語帳「{}」を作成しました。", name.trim()),
                Err(err) => println!("エラー: {err}"),
            }
        }
        "delete" => {
            if let Some(id) = book_at(app, rest.first()) {
                match app.delete_wordbook(&id).await {
                    Ok(()) => println!("単語帳を削除しました。"),
                    Err(err) => println!("エラー: {err}"),
                }
            }
        }
        "words" => {
            if let Some(id) = book_at(app, rest.first()) {
                show_words(app, &id);
            }
        }
        "add" => {
            if rest.len() < 3 {
                println!("使い方: add <番号> <英語> <日本語>");
            } else if let Some(id) = book_at(app, rest.first()) {
                let jp = rest[2..].join(" ");
                match app.add_word(&id, rest[1], &jp).await {
                    Ok(()) => println!("追加しました。"),
                    Err(err) => println!("エラー: {err}"),
                }
            }
        }
        "edit" => {
            if rest.len() < 3 {
                println!("使い方: edit <番号> <英語> <新しい日本語>");
            } else if let Some(id) = book_at(app, rest.first()) {
                let jp = rest[2..].join(" ");
                match app.edit_word(&id, rest[1], &jp).await {
                    Ok(()) => println!("更新しました。"),
                    Err(err) => println!("エラー: {err}"),
                }
            }
        }
        "remove" => {
            if rest.len() < 2 {
                println!("使い方: remove <番号> <英語>");
            } else if let Some(id) = book_at(app, rest.first()) {
                match app.delete_word(&id, rest[1]).await {
                    Ok(()) => println!("削除しました。"),
                    Err(err) => println!("エラー: {err}"),
                }
            }
        }
        "learn" => {
            if let Some(id) = book_at(app, rest.first()) {
                match app.start_session(&id) {
                    Ok(()) => show_card(app, false),
                    Err(err) => println!("エラー: {err}"),
                }
            }
        }
        "review" => match app.start_review() {
            Ok(()) => show_card(app, false),
            Err(err) => println!("エラー: {err}"),
        },
        "flip" => show_card(app, true),
        "u" | "s" | "k" => {
            let kind = match command {
                "u" => Answer::Unknown,
                "s" => Answer::Stock,
                _ => Answer::Known,
            };
            answer(app, kind).await;
        }
        "stop" => {
            app.stop_session();
            println!("セッションを中断しました。");
        }
        "dir" => match rest.first().copied() {
            Some("en") => app.set_direction(QuestionDirection::EnToJp),
            Some("jp") => app.set_direction(QuestionDirection::JpToEn),
            _ => println!("使い方: dir en | dir jp"),
        },
        "login" => match rest.first() {
            Some(user) => login(app, user, input).await,
            None => println!("使い方: login <ユーザーID>"),
        },
        "logout" => {
            app.logout().await;
            println!("ログアウトしました。");
        }
        "export" => match rest.first() {
            Some(path) => export(app, path),
            None => println!("使い方: export <ファイル>"),
        },
        "import" => match rest.first() {
            Some(path) => import(app, path).await,
            None => println!("使い方: import <ファイル>"),
        },
        "lookup" => {
            let query = rest.join(" ");
            match app.lookup_url(&query) {
                Some(url) => println!("{url}"),
                None => println!("検索する語を入力してください。"),
            }
        }
        "quit" | "exit" => return false,
        other => println!("不明なコマンドです: {other}（help で一覧）"),
    }
    true
}

fn print_help() {
    println!("コマンド一覧:");
    println!("  list                     単語帳と復習リストの一覧");
    println!("  create <名前>            単語帳を作成");
    println!("  delete <番号>            単語帳を削除");
    println!("  words <番号>             単語の一覧");
    println!("  add <番号> <英> <日>     単語を追加");
    println!("  edit <番号> <英> <日>    訳を変更");
    println!("  remove <番号> <英>       単語を削除");
    println!("  learn <番号>             学習を開始");
    println!("  review                   復習リストで学習");
    println!("  flip / u / s / k         めくる / 分からない / ストック / 分かった");
    println!("  stop                     セッションを中断");
    println!("  dir en|jp                出題方向");
    println!("  login <ID> / logout      ログイン / ログアウト");
    println!("  export/import <ファイル> ゲストデータの入出力");
    println!("  lookup <語>              翻訳サイトのリンク");
    println!("  quit                     終了");
}

fn list_books(app: &App) {
    if app.wordbooks().is_empty() {
        println!("単語帳はまだありません。");
    }
    for (i, book) in app.wordbooks().iter().enumerate() {
        println!("  {}. {}（{}語）", i + 1, book.name, book.words.len());
    }
    println!("  復習リスト: {}語", app.review_count());
}

fn show_words(app: &App, id: &BookId) {
    match app.find_book(id) {
        Some(book) => {
            for word in book.sorted_words() {
                println!("  {} — {}", word.en, word.jp);
            }
        }
        None => println!("単語帳が見つかりません。"),
    }
}

/// 1-based index from `list` into a stable id.
fn book_at(app: &App, index: Option<&&str>) -> Option<BookId> {
    let index: usize = match index.and_then(|raw| raw.parse().ok()) {
        Some(n) if n >= 1 => n,
        _ => {
            println!("単語帳の番号を指定してください。");
            return None;
        }
    };
    match app.wordbooks().get(index - 1) {
        Some(book) => Some(book.id.clone()),
        None => {
            println!("その番号の単語帳はありません。");
            None
        }
    }
}

fn show_card(app: &App, flipped: bool) {
    match app.card() {
        Some(card) => {
            let face = if flipped { &card.back } else { &card.front };
            let speaker = if !flipped && card.pronunciation_enabled {
                " 🔊"
            } else {
                ""
            };
            println!("[{}] {face}{speaker}", card.progress);
        }
        None => println!("表示するカードがありません。"),
    }
}

async fn answer(app: &mut App, kind: Answer) {
    match app.answer(kind).await {
        Ok(Advance::Next { delay }) => {
            tokio::time::sleep(delay).await;
            show_card(app, false);
        }
        Ok(Advance::Finished(outcome)) => {
            println!(
                "お疲れさまでした！ 分かった: {} / ストック: {} / 分からない: {}",
                outcome.known.len(),
                outcome.stock.len(),
                outcome.unknown.len()
            );
            println!("復習リスト: {}語", app.review_count());
        }
        Err(err) => println!("エラー: {err}"),
    }
}

async fn login(app: &mut App, user: &str, input: &mut Input) {
    match app.login(user).await {
        Ok(LoginOutcome::Done) => println!("ログインしました。"),
        Ok(LoginOutcome::MergePrompt) => {
            println!("ログインしました。");
            print!("この端末のデータをアカウントに統合しますか？ (y/n) ");
            std::io::stdout().flush().ok();
            let accept = matches!(input.next_line().await, Ok(Some(line)) if line.trim() == "y");
            match app.resolve_merge(accept).await {
                Ok(0) => {}
                Ok(count) => println!("{count}冊の単語帳を統合しました。"),
                Err(err) => println!("統合に失敗しました: {err}"),
            }
        }
        Err(err) => println!("ログインに失敗しました: {err}"),
    }
}

fn export(app: &App, path: &str) {
    match app.export_data() {
        Ok(json) => match std::fs::write(path, json) {
            Ok(()) => println!("{path} に書き出しました。"),
            Err(err) => println!("書き出しに失敗しました: {err}"),
        },
        Err(err) => println!("エラー: {err}"),
    }
}

async fn import(app: &mut App, path: &str) {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) => {
            println!("読み込みに失敗しました: {err}");
            return;
        }
    };
    match app.import_data(&raw).await {
        Ok(()) => println!("インポートしました。"),
        Err(err) => println!("エラー: {err}"),
    }
}
