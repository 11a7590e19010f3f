// 终端宿主：把标准输入的每一行当作一次界面操作，并打印渲染结果

use anyhow::{anyhow, bail, Context, Result};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use movie_discover::models::{ReleaseType, SortKey};
use movie_discover::services::{CardLayout, ControlPlacement, SessionView};
use movie_discover::{DiscoverConfig, DiscoverSession, TmdbClient};

const HELP: &str = "\
commands:
  search | more
  genre <id> | genres
  score <min> <max> | votes <min> <max> | runtime <min> <max>
  all-releases on|off | from <YYYY-MM-DD> | to <YYYY-MM-DD>
  country <code>|all | countries | release-type <1-6>
  sort <key>
  kw <text> | suggestions | pick [n] | enter | dismiss | rm <keyword id>
  width <px> | height <px> | scroll <top> <bottom>
  help | quit";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load environment variables
    dotenv::dotenv().ok();

    let config = DiscoverConfig::from_env()?;
    let client = TmdbClient::from_config(&config);
    let session = DiscoverSession::new(&config, Arc::new(client));
    let mut viewport_height = config.viewport_height;

    let view = session.initialize().await;
    print_view(&view);
    println!("{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&command, args)) = words.split_first() else {
            continue;
        };
        if command == "quit" {
            break;
        }

        if let Err(e) = run_command(&session, command, args, &line, &mut viewport_height).await {
            println!("error: {:#}", e);
        }
    }

    Ok(())
}

async fn run_command(
    session: &DiscoverSession,
    command: &str,
    args: &[&str],
    line: &str,
    viewport_height: &mut u32,
) -> Result<()> {
    match command {
        "help" => println!("{}", HELP),
        "search" => print_view(&session.commit_search().await),
        "more" => print_view(&session.load_more().await),
        "genres" => {
            for option in session.genre_options() {
                let mark = if option.selected { "*" } else { " " };
                println!("{} {:>6} {}", mark, option.value, option.label);
            }
        }
        "genre" => {
            let id: u32 = arg(args, 0)?.parse().context("genre id")?;
            let selected = session.toggle_genre(id);
            println!("genre {} {}", id, if selected { "selected" } else { "removed" });
        }
        "score" | "votes" | "runtime" => {
            let (min, max) = (arg(args, 0)?, arg(args, 1)?);
            let fill = session.update_filters(|f| {
                let range = match command {
                    "score" => f.score_mut(),
                    "votes" => f.vote_count_mut(),
                    _ => f.runtime_mut(),
                };
                range.set_input(min, max)?;
                Ok::<_, movie_discover::models::ValidationError>((range.value(), range.track_fill()))
            })?;
            println!(
                "{} {}..{} (track {:.0}%..{:.0}%)",
                command, fill.0.min, fill.0.max, fill.1.min_percent, fill.1.max_percent
            );
        }
        "all-releases" => {
            let enabled = on_off(arg(args, 0)?)?;
            session.update_filters(|f| f.set_search_all_releases(enabled));
        }
        "from" => session.update_filters(|f| f.set_release_from_input(args.first().copied().unwrap_or("")))?,
        "to" => session.update_filters(|f| f.set_release_to_input(args.first().copied().unwrap_or("")))?,
        "country" => {
            let code = arg(args, 0)?;
            if code == "all" {
                session.update_filters(|f| f.set_search_all_countries(true));
            } else {
                session.update_filters(|f| {
                    f.set_search_all_countries(false);
                    f.set_country_input(code)
                })?;
            }
        }
        "countries" => {
            for option in session.country_options().await {
                println!("{:>3} {}", option.value, option.label);
            }
        }
        "release-type" => {
            let release_type = ReleaseType::parse(arg(args, 0)?)?;
            session.update_filters(|f| f.toggle_release_type(release_type));
        }
        "sort" => session.set_sort(SortKey::parse(arg(args, 0)?)?),
        "kw" => {
            let text = line.trim_start().strip_prefix("kw").unwrap_or("").trim_start();
            session.on_keyword_input(text);
        }
        "suggestions" => {
            for (i, keyword) in session.view().autocomplete.suggestions.iter().enumerate() {
                println!("[{}] {} ({})", i, keyword.name, keyword.id);
            }
        }
        "pick" => {
            let index = args.first().map(|a| a.parse::<usize>()).transpose().context("index")?.unwrap_or(0);
            if !session.select_suggestion(index) {
                println!("nothing added");
            }
        }
        "enter" => {
            session.keyword_enter();
        }
        "dismiss" => session.dismiss_suggestions(),
        "rm" => {
            let id: u32 = arg(args, 0)?.parse().context("keyword id")?;
            session.remove_keyword(id);
        }
        "width" => {
            let width: u32 = arg(args, 0)?.parse().context("width")?;
            session.on_resize(width, ControlPlacement::new(0, 40, *viewport_height));
        }
        "scroll" => {
            let top: i32 = arg(args, 0)?.parse().context("top")?;
            let bottom: i32 = arg(args, 1)?.parse().context("bottom")?;
            session.on_scroll(ControlPlacement::new(top, bottom, *viewport_height));
        }
        "height" => *viewport_height = arg(args, 0)?.parse::<u32>().context("height")?,
        other => bail!("unknown command {:?} (try `help`)", other),
    }

    let view = session.view();
    println!(
        "[filters: {:?}{}] keywords: {}",
        view.status,
        if view.floating_action { ", floating search" } else { "" },
        view.keywords
            .iter()
            .map(|k| format!("{}#{}", k.name, k.id))
            .collect::<Vec<_>>()
            .join(", ")
    );
    Ok(())
}

fn arg<'a>(args: &[&'a str], index: usize) -> Result<&'a str> {
    args.get(index)
        .copied()
        .ok_or_else(|| anyhow!("missing argument #{}", index + 1))
}

fn on_off(value: &str) -> Result<bool> {
    match value {
        "on" | "true" | "yes" => Ok(true),
        "off" | "false" | "no" => Ok(false),
        other => bail!("expected on/off, got {:?}", other),
    }
}

fn print_view(view: &SessionView) {
    for card in &view.results.cards {
        println!(
            "{:>3}% [{:<6}] {} ({})",
            card.rating_percent,
            card.rating_color.as_str(),
            card.title,
            card.release_date
        );
        if card.layout == CardLayout::Compact {
            println!("       {}", card.overview);
        }
    }
    println!(
        "{} movies{}",
        view.results.cards.len(),
        if view.has_more { " - `more` to load the next page" } else { "" }
    );
}
