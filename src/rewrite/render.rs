//! Header call rendering and the shared helper definition

/// Name of the helper injected into the declarations file and called before each request
pub const HEADER_FUNCTION: &str = "addDynatraceHeaderTest";

/// Source identifier written into the SI field of every header
pub const SOURCE_ID: &str = "LoadRunner";

/// Transaction name used for requests that appear before any transaction starts
pub const PLACEHOLDER_TRANSACTION: &str = "NoTransaction";

/// Signature that marks the start of the helper definition in a declarations file
pub const HELPER_SIGNATURE: &str = "void addDynatraceHeaderTest(";

/// Body of the helper function spliced into the declarations file.
///
/// Lines are joined with `\n`; [`helper_definition`] converts them to the
/// newline style of the target file.
const HELPER_LINES: &[&str] = &[
    "void addDynatraceHeaderTest(char* header){",
    "    char* headerValue;",
    "    int headerValueLength;",
    "    int vuserid, scid;",
    "    char *groupid, *timestamp;",
    "    char* vuserstring=(char*) malloc(sizeof(char) * 10);",
    "    char* ltnString=(char*) malloc(sizeof(char) * 10);",
    "",
    "    if(lr_get_attrib_string(\"DynatraceLTN\")!=NULL){",
    "        strcpy(ltnString,lr_get_attrib_string(\"DynatraceLTN\"));",
    "    }",
    "    lr_whoami(&vuserid, &groupid, &scid);",
    "    itoa(vuserid,vuserstring,10);",
    "",
    "    headerValueLength = strlen(header) + 4 + strlen(vuserstring) + 4 + strlen(ltnString) + 4;",
    "    headerValue = (char*) malloc(sizeof(char) * headerValueLength);",
    "    strcpy(headerValue, header);",
    "    if(lr_get_attrib_string(\"DynatraceLTN\")!=NULL){",
    "        strcat(headerValue,\"LTN=\");",
    "        strcat(headerValue,ltnString);",
    "        strcat(headerValue,\";\");",
    "    }",
    "    strcat(headerValue,\"VU=\");",
    "    strcat(headerValue,vuserstring);",
    "    strcat(headerValue,\";\");",
    "",
    "    web_add_header(\"X-dynaTrace-Test\", headerValue);",
    "    free(headerValue);",
    "    free(vuserstring);",
    "}",
];

/// Everything needed to render one injected header call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCallSpec {
    /// Transaction the request belongs to (TSN)
    pub transaction_name: String,
    /// Step label taken from the request's first literal (PC)
    pub step_name: String,
    /// Session tag of the script's folder (LSN)
    pub session_tag: String,
}

impl HeaderCallSpec {
    pub fn new(
        transaction_name: impl Into<String>,
        step_name: impl Into<String>,
        session_tag: impl Into<String>,
    ) -> Self {
        Self {
            transaction_name: transaction_name.into(),
            step_name: step_name.into(),
            session_tag: session_tag.into(),
        }
    }

    /// Render the call statement without a line terminator
    pub fn render(&self) -> String {
        format!(
            "\t{}(\"TSN={};PC={};SI={};LSN={};\");",
            HEADER_FUNCTION, self.transaction_name, self.step_name, SOURCE_ID, self.session_tag
        )
    }
}

/// Whether a line holds an injected header call
pub fn is_header_call(line: &str) -> bool {
    line.contains(HEADER_FUNCTION)
}

/// Helper definition using the given newline sequence, ending with a newline
pub fn helper_definition(newline: &str) -> String {
    let mut out = HELPER_LINES.join(newline);
    out.push_str(newline);
    out
}
