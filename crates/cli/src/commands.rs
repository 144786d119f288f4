//! Parsing of the interactive commands.

use bdtheque_core::SortOrder;

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Type into the search box (debounced).
    Search(String),
    /// Click a column header.
    Sort { field: String, order: SortOrder },
    Unsort,
    /// Scroll threshold reached.
    More,
    Reload,
    Show,
    Status,
    Dismiss,
    Stats,
    Rentals(i64),
    History { mid: i64, page: u32 },
    Rent { mid: i64, bid: String },
    Return(i64),
    Delete(String),
    Login(String),
    Logout,
    Metrics,
    Config,
    Help,
    Quit,
}

impl Command {
    /// Label used for the command counter.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Search(_) => "search",
            Command::Sort { .. } => "sort",
            Command::Unsort => "unsort",
            Command::More => "more",
            Command::Reload => "reload",
            Command::Show => "show",
            Command::Status => "status",
            Command::Dismiss => "dismiss",
            Command::Stats => "stats",
            Command::Rentals(_) => "rentals",
            Command::History { .. } => "history",
            Command::Rent { .. } => "rent",
            Command::Return(_) => "return",
            Command::Delete(_) => "delete",
            Command::Login(_) => "login",
            Command::Logout => "logout",
            Command::Metrics => "metrics",
            Command::Config => "config",
            Command::Help => "help",
            Command::Quit => "quit",
        }
    }
}

pub const HELP: &str = "\
Commandes:
  search <texte>            filtrer (vide = tout)
  sort <colonne> [asc|desc] trier par colonne
  unsort                    ordre par défaut
  more                      page suivante
  reload                    recharger la liste
  show | status | dismiss   afficher la liste, l'état, effacer l'erreur
  stats                     statistiques de la collection
  rentals <mid>             locations en cours d'un membre
  history <mid> [page]      historique des locations
  rent <mid> <bid>          louer une BD
  return <lid>              retour d'une location
  delete <bid>              supprimer une BD
  login <token> | logout    session administrateur
  metrics | config | help | quit";

/// Parse one input line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim_start();
    if line.trim().is_empty() {
        return Ok(None);
    }
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest),
        None => (line, ""),
    };
    let args: Vec<&str> = rest.split_whitespace().collect();

    let command = match verb.to_lowercase().as_str() {
        // Search text keeps its inner spacing; the coordinator trims it.
        "search" | "s" => Command::Search(rest.trim_end_matches(['\r', '\n']).to_string()),
        "sort" => {
            let field = args.first().ok_or("usage: sort <colonne> [asc|desc]")?;
            let order = match args.get(1) {
                Some(o) => o.parse::<SortOrder>()?,
                None => SortOrder::Ascending,
            };
            Command::Sort {
                field: field.to_string(),
                order,
            }
        }
        "unsort" => Command::Unsort,
        "more" | "m" => Command::More,
        "reload" => Command::Reload,
        "show" | "ls" => Command::Show,
        "status" => Command::Status,
        "dismiss" => Command::Dismiss,
        "stats" => Command::Stats,
        "rentals" => Command::Rentals(id_arg(&args, 0, "rentals <mid>")?),
        "history" => Command::History {
            mid: id_arg(&args, 0, "history <mid> [page]")?,
            page: match args.get(1) {
                Some(p) => p
                    .parse::<u32>()
                    .map_err(|_| format!("invalid page: {}", p))?,
                None => 0,
            },
        },
        "rent" => {
            let mid = id_arg(&args, 0, "rent <mid> <bid>")?;
            let bid = args.get(1).ok_or("usage: rent <mid> <bid>")?;
            Command::Rent {
                mid,
                bid: bid.to_string(),
            }
        }
        "return" => Command::Return(id_arg(&args, 0, "return <lid>")?),
        "delete" => Command::Delete(args.first().ok_or("usage: delete <bid>")?.to_string()),
        "login" => Command::Login(args.first().ok_or("usage: login <token>")?.to_string()),
        "logout" => Command::Logout,
        "metrics" => Command::Metrics,
        "config" => Command::Config,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(format!("unknown command: {} (try 'help')", other)),
    };
    Ok(Some(command))
}

fn id_arg(args: &[&str], index: usize, usage: &str) -> Result<i64, String> {
    let raw = args.get(index).ok_or_else(|| format!("usage: {}", usage))?;
    raw.parse::<i64>()
        .map_err(|_| format!("invalid id: {}", raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_line() {
        assert_eq!(parse_command("   ").unwrap(), None);
    }

    #[test]
    fn test_search_keeps_text() {
        assert_eq!(
            parse_command("search lucky  luke").unwrap(),
            Some(Command::Search("lucky  luke".to_string()))
        );
        assert_eq!(
            parse_command("search").unwrap(),
            Some(Command::Search(String::new()))
        );
    }

    #[test]
    fn test_sort_defaults_to_ascending() {
        assert_eq!(
            parse_command("sort cote").unwrap(),
            Some(Command::Sort {
                field: "cote".to_string(),
                order: SortOrder::Ascending
            })
        );
        assert_eq!(
            parse_command("sort titreserie desc").unwrap(),
            Some(Command::Sort {
                field: "titreserie".to_string(),
                order: SortOrder::Descending
            })
        );
        assert!(parse_command("sort").is_err());
        assert!(parse_command("sort cote upward").is_err());
    }

    #[test]
    fn test_admin_commands() {
        assert_eq!(
            parse_command("rent 7 bd-001").unwrap(),
            Some(Command::Rent {
                mid: 7,
                bid: "bd-001".to_string()
            })
        );
        assert_eq!(
            parse_command("history 7").unwrap(),
            Some(Command::History { mid: 7, page: 0 })
        );
        let parsed = tokio_test::assert_ok!(parse_command("return 12"));
        assert_eq!(parsed, Some(Command::Return(12)));
        tokio_test::assert_err!(parse_command("return abc"));
        tokio_test::assert_err!(parse_command("rent 7"));
    }

    #[test]
    fn test_unknown_command() {
        let err = parse_command("scroll").unwrap_err();
        assert!(err.contains("unknown command"));
    }

    #[test]
    fn test_command_names() {
        assert_eq!(Command::More.name(), "more");
        assert_eq!(Command::Login("t".to_string()).name(), "login");
    }
}
