mod job_submitter_test;
