use crate::reports;
use nameforge::template::template_summaries;

pub fn run() {
    reports::print_template_table(&template_summaries());
}
