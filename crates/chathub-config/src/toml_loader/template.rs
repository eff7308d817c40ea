/// Default TOML config content with comments.
pub(crate) fn default_config_toml() -> String {
    r##"# ChatHub client configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.

[client]
# conversation_style = "Creative"   # Creative | Balanced | Precise | Designer
# locale = "en-US"
# wss_domain = "sydney.bing.com"
# create_conversation_url = "https://edgeservices.bing.com/edgesvc/turing/conversation/create"
# bypass_server = ""                 # empty = built-in CAPTCHA resolver
# proxy = ""
# no_search = false
# gpt4_turbo = false
# use_classic = false
# option_sets_override = []
# cookies = ""

[timeouts]
# dial_secs = 10                     # 1-60
# read_secs = 60                     # 5-600
# write_secs = 10                    # 1-60
# keep_alive_period_secs = 6         # 1-60
# http_secs = 30                     # 1-300

[logging]
# level = "info"                     # debug | info | warn | error
"##
    .to_string()
}
