use crate::CLAP_STYLING;
use clap::{arg, command};

/// A crawl has to be allowed at least the start page.
pub(crate) fn max_pages_parser() -> clap::builder::RangedU64ValueParser<usize> {
    clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
}

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("probefx")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("probefx")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .arg(arg!(-v --"verbose" "Show debug logging on stderr").required(false))
        .subcommand_required(false)
        .subcommand(
            command!("crawl")
                .about(
                    "Crawl a site breadth-first and list every same-site page reached within \
                the depth and page limits.",
                )
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(true)
                        .help("The URL to start crawling from"),
                )
                .arg(
                    arg!(-d --"depth" <DEPTH>)
                        .required(false)
                        .help("Maximum link depth from the start page")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("3"),
                )
                .arg(
                    arg!(--"max-pages" <NUM_PAGES>)
                        .required(false)
                        .help("Stop after this many pages have been visited")
                        .value_parser(max_pages_parser())
                        .default_value("500"),
                )
                .arg(
                    arg!(--"timeout-ms" <MILLISECONDS>)
                        .required(false)
                        .help("Per-page connect and read timeout in milliseconds")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("5000"),
                )
                .arg(
                    arg!(--"user-agent" <AGENT>)
                        .required(false)
                        .help("User-Agent header sent with every page request")
                        .default_value("ProbeFX/1.0"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Save report to file (default: display to screen)")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: text, json")
                        .value_parser(["text", "json"])
                        .default_value("text"),
                ),
        )
        .subcommand(
            command!("request")
                .about(
                    "Send a single HTTP request and scan the exchange for OWASP Top 10 \
                indicators.",
                )
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(true)
                        .help("The URL to send the request to"),
                )
                .arg(
                    arg!(-X --"method" <METHOD>)
                        .required(false)
                        .help("HTTP method: GET, POST, PUT, DELETE, HEAD, OPTIONS")
                        .default_value("GET"),
                )
                .arg(
                    arg!(-H --"header" <HEADER>)
                        .required(false)
                        .help("Request header as 'Name: Value' (repeatable)")
                        .action(clap::ArgAction::Append),
                )
                .arg(
                    arg!(-d --"data" <BODY>)
                        .required(false)
                        .help("Request body, sent with POST and PUT only"),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Request timeout in seconds")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("30"),
                )
                .arg(
                    arg!(--"max-body-bytes" <BYTES>)
                        .required(false)
                        .help("Only scan this many bytes of each body")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Save report to file (default: display to screen)")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: text, json")
                        .value_parser(["text", "json"])
                        .default_value("text"),
                ),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crawl_max_pages_defaults_to_cap() {
        let matches = command_argument_builder()
            .try_get_matches_from(["probefx", "crawl", "-u", "http://example.com"])
            .unwrap();
        let (_, crawl) = matches.subcommand().unwrap();
        assert_eq!(crawl.get_one::<usize>("max-pages"), Some(&500));
    }

    #[test]
    fn test_crawl_rejects_zero_max_pages() {
        let result = command_argument_builder().try_get_matches_from([
            "probefx",
            "crawl",
            "-u",
            "http://example.com",
            "--max-pages",
            "0",
        ]);
        assert!(result.is_err());
    }
}
