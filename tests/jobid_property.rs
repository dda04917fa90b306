// tests/jobid_property.rs

//! Property: the extracted job id is always the final whitespace-delimited
//! token of the submit output.

use proptest::prelude::*;

use runset::exec::extract_job_id;

proptest! {
    #[test]
    fn job_id_is_the_final_whitespace_token(
        tokens in proptest::collection::vec("[A-Za-z0-9_]{1,12}", 1..8),
        trailing in "[ \t\n]{0,3}",
    ) {
        let output = format!("{}{}", tokens.join(" "), trailing);
        prop_assert_eq!(
            extract_job_id(&output),
            Some(tokens.last().unwrap().as_str())
        );
    }

    #[test]
    fn whitespace_only_output_has_no_job_id(ws in "[ \t\n]{0,6}") {
        prop_assert_eq!(extract_job_id(&ws), None);
    }
}
